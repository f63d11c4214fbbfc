//! Savings, battery autonomy and loan figures derived from a run's generation.

use std::fmt;

use serde::Serialize;

/// Days used to annualize a daily snapshot.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// CO2 avoided in kg for `kwh` of solar generation.
pub fn co2_savings_kg(kwh: f64, co2_kg_per_kwh: f64) -> f64 {
    kwh * co2_kg_per_kwh
}

/// Grid electricity cost avoided for `kwh` of solar generation.
pub fn cost_savings(kwh: f64, price_per_kwh: f64) -> f64 {
    kwh * price_per_kwh
}

/// How long a battery can carry the site without sun.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatteryBackup {
    /// Capacity after round-trip losses (kWh).
    pub usable_kwh: f64,
    /// Days of autonomy at the given daily consumption.
    pub backup_days: f64,
    /// Whether `backup_days` reaches the required autonomy.
    pub meets_autonomy: bool,
}

/// Days of autonomy a battery provides against a daily energy figure.
///
/// Returns zero days when `daily_kwh` is not positive.
pub fn battery_backup(
    daily_kwh: f64,
    capacity_kwh: f64,
    efficiency: f64,
    required_days: f64,
) -> BatteryBackup {
    let usable_kwh = capacity_kwh * efficiency;
    let backup_days = if daily_kwh > 0.0 {
        usable_kwh / daily_kwh
    } else {
        0.0
    };
    BatteryBackup {
        usable_kwh,
        backup_days,
        meets_autonomy: backup_days >= required_days,
    }
}

/// Yearly annuity payment for a loan.
///
/// A zero rate repays the principal linearly. Returns `None` for a zero
/// term.
pub fn loan_annuity(principal: f64, annual_rate_pct: f64, years: u32) -> Option<f64> {
    if years == 0 {
        return None;
    }
    let n = f64::from(years);
    let r = annual_rate_pct / 100.0;
    if r == 0.0 {
        return Some(principal / n);
    }
    let growth = (1.0 + r).powf(n);
    Some(principal * (r * growth) / (growth - 1.0))
}

/// Simple payback period in years; `None` when cash flow never turns positive.
pub fn payback_years(investment: f64, annual_net_cash_flow: f64) -> Option<f64> {
    (annual_net_cash_flow > 0.0).then(|| investment / annual_net_cash_flow)
}

/// Inputs for the economics report.
#[derive(Debug, Clone, PartialEq)]
pub struct EconomicsInput {
    pub price_per_kwh: f64,
    pub co2_kg_per_kwh: f64,
    pub loan_amount: f64,
    pub interest_rate_pct: f64,
    pub loan_years: u32,
    /// Yearly revenue from EV charging sessions.
    pub ev_charging_revenue: f64,
    /// Yearly revenue from selling energy to peers and the grid.
    pub energy_sales_revenue: f64,
    /// Days the batteries should carry the site without sun.
    pub days_autonomy: f64,
    /// Daily output of the sized panel block, when one is configured (kWh).
    pub panel_daily_kwh: Option<f64>,
}

/// Annual figures for a single panel block sized from its geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PanelSizing {
    pub daily_kwh: f64,
    pub annual_kwh: f64,
    pub annual_co2_savings_kg: f64,
    pub annual_cost_savings: f64,
}

impl PanelSizing {
    /// Annualizes a daily panel output at the given price and emission factor.
    pub fn from_daily_output(daily_kwh: f64, input: &EconomicsInput) -> Self {
        let annual_kwh = daily_kwh * DAYS_PER_YEAR;
        Self {
            daily_kwh,
            annual_kwh,
            annual_co2_savings_kg: co2_savings_kg(annual_kwh, input.co2_kg_per_kwh),
            annual_cost_savings: cost_savings(annual_kwh, input.price_per_kwh),
        }
    }
}

/// Annualized savings and financing of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EconomicsReport {
    pub annual_generation_kwh: f64,
    pub annual_co2_savings_kg: f64,
    pub annual_cost_savings: f64,
    pub annual_revenue: f64,
    /// Yearly loan payment (0 without a loan).
    pub annual_loan_payment: f64,
    pub annual_net_cash_flow: f64,
    /// `None` when the project never pays back.
    pub payback_years: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel_sizing: Option<PanelSizing>,
}

impl EconomicsReport {
    /// Annualizes a daily generation figure and applies the financing.
    pub fn from_daily_generation(daily_generation_kwh: f64, input: &EconomicsInput) -> Self {
        let annual_generation_kwh = daily_generation_kwh * DAYS_PER_YEAR;
        let annual_cost_savings = cost_savings(annual_generation_kwh, input.price_per_kwh);
        let annual_revenue =
            annual_cost_savings + input.ev_charging_revenue + input.energy_sales_revenue;
        let annual_loan_payment =
            loan_annuity(input.loan_amount, input.interest_rate_pct, input.loan_years)
                .unwrap_or(0.0);
        let annual_net_cash_flow = annual_revenue - annual_loan_payment;

        Self {
            annual_generation_kwh,
            annual_co2_savings_kg: co2_savings_kg(annual_generation_kwh, input.co2_kg_per_kwh),
            annual_cost_savings,
            annual_revenue,
            annual_loan_payment,
            annual_net_cash_flow,
            payback_years: payback_years(input.loan_amount, annual_net_cash_flow),
            panel_sizing: input
                .panel_daily_kwh
                .map(|kwh| PanelSizing::from_daily_output(kwh, input)),
        }
    }
}

impl fmt::Display for EconomicsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Economics ---")?;
        writeln!(f, "Annual generation:     {:.0} kWh", self.annual_generation_kwh)?;
        writeln!(f, "Annual CO2 savings:    {:.0} kg", self.annual_co2_savings_kg)?;
        writeln!(f, "Annual cost savings:   {:.2}", self.annual_cost_savings)?;
        writeln!(f, "Annual revenue:        {:.2}", self.annual_revenue)?;
        writeln!(f, "Annual loan payment:   {:.2}", self.annual_loan_payment)?;
        match self.payback_years {
            Some(years) => write!(f, "Payback:               {years:.1} years")?,
            None => write!(f, "Payback:               never")?,
        }
        if let Some(panel) = &self.panel_sizing {
            writeln!(f, "\n\n--- Panel sizing ---")?;
            writeln!(f, "Daily output:          {:.2} kWh", panel.daily_kwh)?;
            writeln!(f, "Annual output:         {:.0} kWh", panel.annual_kwh)?;
            writeln!(f, "Annual CO2 savings:    {:.0} kg", panel.annual_co2_savings_kg)?;
            write!(f, "Annual cost savings:   {:.2}", panel.annual_cost_savings)?;
        }
        Ok(())
    }
}

//! Typed run inputs derived from [`Parameters`].

use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::parameters::{Parameters, SETUP};
use super::values::{parse_bool, parse_date, parse_integer, split_list};
use crate::error::ConstructionError;
use crate::settings::{expand_home, resolve_against};

/// Analytics the engine knows how to schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Analytic {
    Npv,
    Cashflow,
    Sensitivity,
    Stress,
    Var,
    Exposure,
    Xva,
    MarketData,
}

impl Analytic {
    pub fn as_str(self) -> &'static str {
        match self {
            Analytic::Npv => "NPV",
            Analytic::Cashflow => "CASHFLOW",
            Analytic::Sensitivity => "SENSITIVITY",
            Analytic::Stress => "STRESS",
            Analytic::Var => "VAR",
            Analytic::Exposure => "EXPOSURE",
            Analytic::Xva => "XVA",
            Analytic::MarketData => "MARKETDATA",
        }
    }
}

impl fmt::Display for Analytic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameter group -> analytic, in scheduling order.
const ANALYTIC_GROUPS: &[(&str, Analytic)] = &[
    ("npv", Analytic::Npv),
    ("cashflow", Analytic::Cashflow),
    ("sensitivity", Analytic::Sensitivity),
    ("stress", Analytic::Stress),
    ("parametricVar", Analytic::Var),
    ("simulation", Analytic::Exposure),
    ("xva", Analytic::Xva),
];

/// Single configuration files referenced from the setup group, resolved
/// against the input path. `None` when not configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFiles {
    pub conventions: Option<PathBuf>,
    pub curve_configs: Option<PathBuf>,
    pub pricing_engines: Option<PathBuf>,
    pub todays_market: Option<PathBuf>,
    pub reference_data: Option<PathBuf>,
    pub ibor_fallback: Option<PathBuf>,
    pub calendar_adjustment: Option<PathBuf>,
    pub currency_config: Option<PathBuf>,
}

/// Inputs of the parametric VaR analytic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarInputs {
    pub covariance_file: PathBuf,
    pub sensitivity_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputParameters {
    pub asof: NaiveDate,
    pub input_path: PathBuf,
    pub results_path: PathBuf,
    pub base_currency: Option<String>,

    pub entire_market: bool,
    pub all_fixings: bool,
    pub eom_inflation_fixings: bool,
    pub use_market_data_fixings: bool,
    pub imply_todays_fixings: bool,
    pub build_failed_trades: bool,
    pub dry_run: bool,
    pub continue_on_error: bool,
    pub lazy_market_building: bool,
    pub ibor_fallback_override: bool,
    pub threads: usize,
    pub report_na_string: String,
    pub observation_model: Option<String>,

    pub market_data_files: Vec<PathBuf>,
    pub fixing_data_files: Vec<PathBuf>,
    pub dividend_data_files: Vec<PathBuf>,
    pub portfolio_files: Vec<PathBuf>,
    pub config_files: ConfigFiles,
    /// Market context -> market configuration id.
    pub market_configs: BTreeMap<String, String>,

    pub output_curves: bool,
    pub var: Option<VarInputs>,
    pub analytics: Vec<Analytic>,
}

impl InputParameters {
    pub fn from_parameters(params: &Parameters) -> Result<Self, ConstructionError> {
        debug!("building input parameters");

        if !params.has_group(SETUP) {
            return Err(ConstructionError::MissingGroup { group: SETUP.to_string() });
        }

        let input_path = expand_home(params.get(SETUP, "inputPath")?);
        let results_path = expand_home(params.get(SETUP, "outputPath")?);

        let asof_raw = params.get(SETUP, "asofDate")?;
        let asof = parse_date(asof_raw)
            .map_err(|reason| ConstructionError::invalid(SETUP, "asofDate", asof_raw, reason))?;

        let base_currency = params.get_opt("npv", "baseCurrency").map(str::to_string);
        if base_currency.is_none() {
            warn!("base currency not set");
        }

        let threads = match params.get_opt(SETUP, "nThreads") {
            None => 1,
            Some(raw) => parse_integer(raw)
                .and_then(|n| {
                    usize::try_from(n)
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or_else(|| format!("thread count must be positive, got {n}"))
                })
                .map_err(|reason| ConstructionError::invalid(SETUP, "nThreads", raw, reason))?,
        };

        let files = |name: &str| -> Vec<PathBuf> {
            match params.get_opt(SETUP, name) {
                Some(list) => split_list(list)
                    .iter()
                    .map(|f| resolve_against(&input_path, f))
                    .collect(),
                None => {
                    warn!(parameter = name, "data files not configured");
                    Vec::new()
                }
            }
        };

        let portfolio_files = match split_list(params.get(SETUP, "portfolioFile")?) {
            list if list.is_empty() => {
                warn!("portfolio data not found");
                Vec::new()
            }
            list => list.iter().map(|f| resolve_against(&input_path, f)).collect(),
        };

        let market_configs = params.markets();
        for (context, config) in &market_configs {
            debug!(%context, %config, "market context");
        }

        let analytics = requested_analytics(params)?;
        let var = if analytics.contains(&Analytic::Var) {
            Some(VarInputs {
                covariance_file: required_file(params, &input_path, "parametricVar", "covarianceInputFile")?,
                sensitivity_file: required_file(params, &input_path, "parametricVar", "sensitivityInputFile")?,
            })
        } else {
            None
        };

        let inputs = Self {
            asof,
            base_currency,
            entire_market: flag(params, SETUP, "entireMarket", true)?,
            all_fixings: flag(params, SETUP, "allFixings", true)?,
            eom_inflation_fixings: flag(params, SETUP, "eomInflationFixings", false)?,
            use_market_data_fixings: flag(params, SETUP, "useMarketDataFixings", false)?,
            imply_todays_fixings: flag(params, SETUP, "implyTodaysFixings", false)?,
            build_failed_trades: flag(params, SETUP, "buildFailedTrades", false)?,
            dry_run: flag(params, SETUP, "dryRun", false)?,
            continue_on_error: flag(params, SETUP, "continueOnError", false)?,
            lazy_market_building: flag(params, SETUP, "lazyMarketBuilding", false)?,
            ibor_fallback_override: flag(params, SETUP, "iborFallbackOverride", false)?,
            threads,
            report_na_string: params.get_opt(SETUP, "reportNaString").unwrap_or("#N/A").to_string(),
            observation_model: params.get_opt(SETUP, "observationModel").map(str::to_string),
            market_data_files: files("marketDataFile"),
            fixing_data_files: files("fixingDataFile"),
            dividend_data_files: files("dividendDataFile"),
            portfolio_files,
            config_files: ConfigFiles {
                conventions: optional_file(params, &input_path, "conventionsFile"),
                curve_configs: optional_file(params, &input_path, "curveConfigFile"),
                pricing_engines: optional_file(params, &input_path, "pricingEnginesFile"),
                todays_market: optional_file(params, &input_path, "marketConfigFile"),
                reference_data: optional_file(params, &input_path, "referenceDataFile"),
                ibor_fallback: optional_file(params, &input_path, "iborFallbackConfig"),
                calendar_adjustment: optional_file(params, &input_path, "calendarAdjustment"),
                currency_config: optional_file(params, &input_path, "currencyConfiguration"),
            },
            market_configs,
            output_curves: flag(params, "curves", "active", false)?,
            var,
            analytics,
            input_path,
            results_path,
        };

        info!(
            asof = %inputs.asof,
            analytics = ?inputs.analytics,
            threads = inputs.threads,
            "input parameters ready"
        );
        Ok(inputs)
    }

    pub fn has_analytic(&self, analytic: Analytic) -> bool {
        self.analytics.contains(&analytic)
    }

    pub fn results_path(&self) -> &Path {
        &self.results_path
    }
}

fn flag(params: &Parameters, group: &str, name: &str, default: bool) -> Result<bool, ConstructionError> {
    match params.get_opt(group, name) {
        None => Ok(default),
        Some(raw) => {
            parse_bool(raw).map_err(|reason| ConstructionError::invalid(group, name, raw, reason))
        }
    }
}

fn optional_file(params: &Parameters, input_path: &Path, name: &str) -> Option<PathBuf> {
    match params.get_opt(SETUP, name) {
        Some(file) => {
            let path = resolve_against(input_path, file);
            debug!(parameter = name, path = %path.display(), "configuration file");
            Some(path)
        }
        None => {
            warn!(parameter = name, "configuration file not set, using defaults");
            None
        }
    }
}

fn required_file(
    params: &Parameters,
    input_path: &Path,
    group: &str,
    name: &str,
) -> Result<PathBuf, ConstructionError> {
    params
        .get_opt(group, name)
        .map(|file| resolve_against(input_path, file))
        .ok_or_else(|| ConstructionError::missing(group, name))
}

fn requested_analytics(params: &Parameters) -> Result<Vec<Analytic>, ConstructionError> {
    let mut analytics = Vec::new();
    for (group, analytic) in ANALYTIC_GROUPS {
        if flag(params, group, "active", false)? {
            analytics.push(*analytic);
        }
    }
    if analytics.is_empty() {
        analytics.push(Analytic::MarketData);
    }
    Ok(analytics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(setup: &str, analytics: &str) -> Parameters {
        let xml = format!(
            r#"<ORE>
  <Setup>
    <Parameter name="asofDate">2016-02-05</Parameter>
    <Parameter name="inputPath">/ore/Input</Parameter>
    <Parameter name="outputPath">/ore/Output</Parameter>
    <Parameter name="logFile">log.txt</Parameter>
    <Parameter name="portfolioFile">portfolio.xml</Parameter>
    {setup}
  </Setup>
  <Markets>
    <Parameter name="pricing">default</Parameter>
  </Markets>
  <Analytics>{analytics}</Analytics>
</ORE>"#
        );
        Parameters::from_xml_str(&xml).unwrap()
    }

    #[test]
    fn defaults() {
        let inputs = InputParameters::from_parameters(&params("", "")).unwrap();
        assert_eq!(inputs.asof, NaiveDate::from_ymd_opt(2016, 2, 5).unwrap());
        assert_eq!(inputs.results_path(), Path::new("/ore/Output"));
        assert!(inputs.entire_market);
        assert!(inputs.all_fixings);
        assert!(!inputs.build_failed_trades);
        assert_eq!(inputs.threads, 1);
        assert_eq!(inputs.report_na_string, "#N/A");
        assert_eq!(inputs.base_currency, None);
        assert_eq!(inputs.portfolio_files, vec![PathBuf::from("/ore/Input/portfolio.xml")]);
        assert_eq!(inputs.analytics, vec![Analytic::MarketData]);
        assert_eq!(inputs.market_configs.get("pricing").map(String::as_str), Some("default"));
    }

    #[test]
    fn setup_overrides() {
        let setup = r#"
            <Parameter name="nThreads">4</Parameter>
            <Parameter name="entireMarket">N</Parameter>
            <Parameter name="dryRun">Y</Parameter>
            <Parameter name="reportNaString">NA</Parameter>
            <Parameter name="marketDataFile">market.txt; /abs/market2.txt</Parameter>
            <Parameter name="conventionsFile">conventions.xml</Parameter>"#;
        let inputs = InputParameters::from_parameters(&params(setup, "")).unwrap();
        assert_eq!(inputs.threads, 4);
        assert!(!inputs.entire_market);
        assert!(inputs.dry_run);
        assert_eq!(inputs.report_na_string, "NA");
        assert_eq!(
            inputs.market_data_files,
            vec![PathBuf::from("/ore/Input/market.txt"), PathBuf::from("/abs/market2.txt")]
        );
        assert_eq!(
            inputs.config_files.conventions,
            Some(PathBuf::from("/ore/Input/conventions.xml"))
        );
        assert_eq!(inputs.config_files.curve_configs, None);
        assert!(inputs.fixing_data_files.is_empty());
    }

    #[test]
    fn all_fixings_can_be_switched_off() {
        let setup = r#"<Parameter name="allFixings">N</Parameter>"#;
        let inputs = InputParameters::from_parameters(&params(setup, "")).unwrap();
        assert!(!inputs.all_fixings);
        assert!(inputs.entire_market);
    }

    #[test]
    fn active_analytics_in_order() {
        let analytics = r#"
            <Analytic type="xva"><Parameter name="active">Y</Parameter></Analytic>
            <Analytic type="cashflow"><Parameter name="active">N</Parameter></Analytic>
            <Analytic type="npv">
              <Parameter name="active">Y</Parameter>
              <Parameter name="baseCurrency">EUR</Parameter>
            </Analytic>
            <Analytic type="curves"><Parameter name="active">Y</Parameter></Analytic>"#;
        let inputs = InputParameters::from_parameters(&params("", analytics)).unwrap();
        assert_eq!(inputs.analytics, vec![Analytic::Npv, Analytic::Xva]);
        assert!(inputs.has_analytic(Analytic::Xva));
        assert!(!inputs.has_analytic(Analytic::MarketData));
        assert!(inputs.output_curves);
        assert_eq!(inputs.base_currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn var_requires_input_files() {
        let analytics = r#"<Analytic type="parametricVar">
            <Parameter name="active">Y</Parameter>
            <Parameter name="covarianceInputFile">covariance.csv</Parameter>
        </Analytic>"#;
        let err = InputParameters::from_parameters(&params("", analytics)).unwrap_err();
        assert!(err.to_string().contains("sensitivityInputFile"));
    }

    #[test]
    fn var_inputs_resolved() {
        let analytics = r#"<Analytic type="parametricVar">
            <Parameter name="active">Y</Parameter>
            <Parameter name="covarianceInputFile">covariance.csv</Parameter>
            <Parameter name="sensitivityInputFile">sensitivity.csv</Parameter>
        </Analytic>"#;
        let inputs = InputParameters::from_parameters(&params("", analytics)).unwrap();
        let var = inputs.var.unwrap();
        assert_eq!(var.covariance_file, PathBuf::from("/ore/Input/covariance.csv"));
        assert_eq!(var.sensitivity_file, PathBuf::from("/ore/Input/sensitivity.csv"));
    }

    #[test]
    fn invalid_flag_names_parameter() {
        let setup = r#"<Parameter name="dryRun">maybe</Parameter>"#;
        let err = InputParameters::from_parameters(&params(setup, "")).unwrap_err();
        assert!(err.to_string().contains("setup.dryRun"));
    }

    #[test]
    fn zero_threads_rejected() {
        let setup = r#"<Parameter name="nThreads">0</Parameter>"#;
        let err = InputParameters::from_parameters(&params(setup, "")).unwrap_err();
        assert!(matches!(err, ConstructionError::InvalidValue { .. }));
    }

    #[test]
    fn missing_asof_date() {
        let xml = r#"<ORE><Setup>
            <Parameter name="inputPath">Input</Parameter>
            <Parameter name="outputPath">Output</Parameter>
        </Setup></ORE>"#;
        let p = Parameters::from_xml_str(xml).unwrap();
        let err = InputParameters::from_parameters(&p).unwrap_err();
        assert!(err.to_string().contains("asofDate"));
    }

    #[test]
    fn missing_setup_group() {
        let err = InputParameters::from_parameters(&Parameters::default()).unwrap_err();
        assert!(matches!(err, ConstructionError::MissingGroup { .. }));
    }
}

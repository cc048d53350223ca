use clap::{Parser, Subcommand};
use growth_core::*;

#[derive(Parser)]
#[command(name = "growthcalc")]
#[command(about = "Pediatric growth derived-metrics calculator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one calculation and print the result bundle as JSON
    Calculate {
        /// Patient sex (male, female)
        #[arg(long)]
        sex: Option<String>,

        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        birth_date: Option<String>,

        /// Measurement date (YYYY-MM-DD)
        #[arg(long)]
        measurement_date: Option<String>,

        /// Weight in kg
        #[arg(long)]
        weight: Option<String>,

        /// Height in cm
        #[arg(long)]
        height: Option<String>,

        /// Head circumference (OFC) in cm
        #[arg(long)]
        ofc: Option<String>,

        /// Gestation at birth, whole weeks
        #[arg(long)]
        gestation_weeks: Option<String>,

        /// Gestation at birth, additional days (0-6)
        #[arg(long)]
        gestation_days: Option<String>,

        /// Previous height in cm (for height velocity)
        #[arg(long)]
        previous_height: Option<String>,

        /// Previous measurement date (YYYY-MM-DD)
        #[arg(long)]
        previous_date: Option<String>,

        /// Maternal height in cm (for mid-parental height)
        #[arg(long)]
        maternal_height: Option<String>,

        /// Paternal height in cm (for mid-parental height)
        #[arg(long)]
        paternal_height: Option<String>,

        /// Reference dataset identifier
        #[arg(long)]
        reference: Option<String>,
    },

    /// Convert a GH dose between units
    ConvertDose {
        /// Dose value
        value: f64,

        /// Source unit (mcg/kg/day, mg/day, mg/m2/week)
        #[arg(long)]
        from: String,

        /// Target unit (mcg/kg/day, mg/day, mg/m2/week)
        #[arg(long)]
        to: String,

        /// Patient weight in kg (needed for per-kg units)
        #[arg(long)]
        weight: Option<f64>,

        /// Patient BSA in m² (needed for per-m² units)
        #[arg(long)]
        bsa: Option<f64>,
    },

    /// Show the chart age-range window for a measurement kind
    Range {
        /// Measurement kind (weight, height, bmi, ofc)
        kind: String,

        /// Patient decimal age in years (omit if unknown)
        #[arg(long)]
        age: Option<f64>,

        /// Whether a mid-parental height is available
        #[arg(long)]
        mph: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    growth_core::logging::init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Calculate {
            sex,
            birth_date,
            measurement_date,
            weight,
            height,
            ofc,
            gestation_weeks,
            gestation_days,
            previous_height,
            previous_date,
            maternal_height,
            paternal_height,
            reference,
        } => {
            let raw = RawInput {
                sex,
                birth_date,
                measurement_date,
                gestation_weeks,
                gestation_days,
                weight,
                height,
                ofc,
                previous_height,
                previous_date,
                maternal_height,
                paternal_height,
                reference: reference.or(Some(config.reference.dataset.clone())),
            };
            cmd_calculate(&raw, &config)
        }

        Commands::ConvertDose {
            value,
            from,
            to,
            weight,
            bsa,
        } => cmd_convert_dose(value, &from, &to, weight, bsa),

        Commands::Range { kind, age, mph } => cmd_range(&kind, age, mph),
    }
}

fn cmd_calculate(raw: &RawInput, config: &Config) -> Result<()> {
    let today = chrono::Local::now().date_naive();

    let input = match validate(raw, today) {
        Ok(input) => input,
        Err(failures) => {
            // All failures are reported together so the user can fix
            // everything in one pass
            let report = serde_json::json!({
                "success": false,
                "failures": failures,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            std::process::exit(1);
        }
    };

    // No provider is wired into the CLI; centile readings come back
    // absent and the bundle is a partial result
    let bundle = evaluate(&input, &UnavailableCentileSource, config)?;

    let report = serde_json::json!({
        "success": true,
        "results": bundle,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn cmd_convert_dose(
    value: f64,
    from: &str,
    to: &str,
    weight: Option<f64>,
    bsa: Option<f64>,
) -> Result<()> {
    let from: DoseUnit = from.parse()?;
    let to: DoseUnit = to.parse()?;
    let ctx = DoseContext {
        weight_kg: weight,
        bsa_m2: bsa,
    };

    let converted = growth_core::dose::convert(value, from, to, &ctx)?;
    println!("{converted} {to}");

    Ok(())
}

fn cmd_range(kind: &str, age: Option<f64>, mph: bool) -> Result<()> {
    let kind = match kind.to_lowercase().as_str() {
        "weight" => MeasurementKind::Weight,
        "height" => MeasurementKind::Height,
        "bmi" => MeasurementKind::Bmi,
        "ofc" => MeasurementKind::Ofc,
        other => {
            return Err(Error::Config(format!("unknown measurement kind: {other}")));
        }
    };

    let selection = growth_core::age_range::select(kind, age, mph);
    println!("{}", selection.range_key.as_str());

    Ok(())
}

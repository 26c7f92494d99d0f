use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Args, Command, FromArgMatches as _};

use crate::context::Context;
use crate::error::EpidemicError;
use crate::hospital::HealthAuthority;
use crate::log::{info, set_log_level, LevelFilter};
use crate::parameters::Parameters;
use crate::population::{create_hospitals, create_population, seed_infections};
use crate::random::ContextRandomExt;
use crate::report::ContextReportExt;
use crate::reporting;

/// Default cli arguments for the simulator
#[derive(Args, Debug, Clone, Default)]
pub struct BaseArgs {
    /// Random seed; overrides the seed in the parameters file
    #[arg(short, long)]
    pub random_seed: Option<u64>,

    /// Optional path for a JSON parameters file
    #[arg(short, long, default_value = "")]
    pub config: String,

    /// Optional directory for report output. No reports are written without it
    #[arg(short, long, default_value = "")]
    pub output_dir: String,

    /// Prefix for report file names
    #[arg(short, long, default_value = "")]
    pub prefix: String,

    /// Replace report files left by a previous run
    #[arg(short, long)]
    pub force_overwrite: bool,

    /// Number of days to simulate; overrides the parameters file
    #[arg(short, long)]
    pub days: Option<u32>,

    /// Enable logging at the given level (error, warn, info, debug or trace)
    #[arg(short, long)]
    pub log_level: Option<String>,
}

fn create_cli() -> Command {
    let cli = Command::new("contagion")
        .about("Agent-based epidemic simulation with hospitals and reactive public-health policy");
    BaseArgs::augment_args(cli)
}

/// Parses the command line and runs a simulation with it.
///
/// # Errors
/// Returns an error if argument parsing or the simulation setup fails
pub fn run_with_args() -> Result<Context, Box<dyn std::error::Error>> {
    let matches = create_cli().get_matches();
    let args = BaseArgs::from_arg_matches(&matches)?;
    Ok(run_with_args_internal(&args)?)
}

/// Builds a context from the parameters file named in `args` (or the defaults), applies the
/// command line overrides and runs it to completion.
///
/// # Errors
/// Returns an `EpidemicError` if the parameters are invalid, the log level is unknown, or the
/// report files cannot be created.
pub fn run_with_args_internal(args: &BaseArgs) -> Result<Context, EpidemicError> {
    if let Some(level) = &args.log_level {
        let level = LevelFilter::from_str(level)
            .map_err(|_| EpidemicError::InvalidParameter(format!("unknown log level {level:?}")))?;
        set_log_level(level);
    }

    // Optionally load parameters from a file
    let mut parameters = if args.config.is_empty() {
        Parameters::default()
    } else {
        info!("Loading parameters from: {}", args.config);
        Parameters::load(Path::new(&args.config))?
    };
    if let Some(seed) = args.random_seed {
        parameters.seed = seed;
    }
    if let Some(days) = args.days {
        parameters.days = days;
    }

    let mut context = setup(&parameters)?;

    // Optionally write reports
    if !args.output_dir.is_empty() {
        context
            .report_options()
            .directory(PathBuf::from(&args.output_dir))
            .file_prefix(args.prefix.clone())
            .overwrite(args.force_overwrite);
        reporting::init(&mut context)?;
    }

    context.execute(parameters.days);
    context.log_summary();
    Ok(context)
}

/// Creates a ready-to-run context: seeded random streams, hospitals, population, initial
/// infections and the initial policy.
///
/// # Errors
/// Returns an `EpidemicError` if the parameters fail validation.
pub fn setup(parameters: &Parameters) -> Result<Context, EpidemicError> {
    parameters.validate()?;
    let mut context = Context::new(parameters.world);
    context.init_random(parameters.seed);

    let hospitals = create_hospitals(
        parameters.hospitals.count,
        parameters.hospitals.capacity,
        parameters.hospitals.expensive_probability,
        context.rng_store(),
    );
    context.set_health_authority(HealthAuthority::new(
        hospitals,
        parameters.guidelines.clone(),
    ));
    create_population(&mut context, &parameters.population)?;
    seed_infections(&mut context, &parameters.initial_infections)?;
    context.set_policy(parameters.initial_policy.clone())?;
    Ok(context)
}

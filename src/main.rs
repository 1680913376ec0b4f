use autoproposta::catalog::{
    dashboard_stats, filter, format_price, proposals_by_model, sales_by_make, ChartPoint,
    DashboardStats, FilterQuery, Vehicle,
};
use autoproposta::config::{Config, DataArgs, ServeArgs};
use autoproposta::location::{state_display_name, LocationResolver};
use autoproposta::provider::{load_dataset, Dataset};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// AutoProposta: vehicle marketplace catalog and admin API.
///
/// Examples:
///   autoproposta serve --port 3000
///   autoproposta search --state SP --make Toyota,Honda --transmission automatic
///   autoproposta cities RJ
///   autoproposta regions SP "São Paulo"
///   autoproposta stats --offline
#[derive(Parser)]
#[command(name = "autoproposta", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API.
    Serve(ServeArgs),

    /// Filter the catalog and print matching vehicles as JSON.
    Search(SearchArgs),

    /// List the cities of a state (e.g. SP).
    Cities { state: String },

    /// List the regions of a city.
    Regions { state: String, city: String },

    /// Print dashboard statistics.
    Stats {
        #[command(flatten)]
        data: DataArgs,
    },
}

#[derive(Args)]
struct SearchArgs {
    #[arg(long)]
    state: Option<String>,

    #[arg(long)]
    city: Option<String>,

    #[arg(long)]
    region: Option<String>,

    #[arg(long)]
    price_min: Option<u64>,

    #[arg(long)]
    price_max: Option<u64>,

    #[arg(long)]
    year_min: Option<u16>,

    #[arg(long)]
    year_max: Option<u16>,

    /// Comma separated makes (e.g. Honda,Fiat).
    #[arg(long)]
    make: Option<String>,

    /// Comma separated models.
    #[arg(long)]
    model: Option<String>,

    /// "manual", "automatic" or both, comma separated.
    #[arg(long)]
    transmission: Option<String>,

    /// Free text over make and model.
    #[arg(long, short = 'q')]
    q: Option<String>,

    #[command(flatten)]
    data: DataArgs,
}

impl SearchArgs {
    fn query(&self) -> FilterQuery {
        FilterQuery {
            state: self.state.clone(),
            city: self.city.clone(),
            region: self.region.clone(),
            price_min: self.price_min.map(|n| n.to_string()),
            price_max: self.price_max.map(|n| n.to_string()),
            year_min: self.year_min.map(|n| n.to_string()),
            year_max: self.year_max.map(|n| n.to_string()),
            make: self.make.clone(),
            model: self.model.clone(),
            transmission: self.transmission.clone(),
            q: self.q.clone(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsReport {
    #[serde(flatten)]
    dashboard: DashboardStats,
    sales_by_make: Vec<ChartPoint>,
    proposals_by_model: Vec<ChartPoint>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => serve(Config::from(&args)),
        Command::Search(args) => search(&args),
        Command::Cities { state } => cities(&state),
        Command::Regions { state, city } => regions(&state, &city),
        Command::Stats { data } => stats(&data),
    }
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", msg);
    std::process::exit(1);
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => fail(e),
    }
}

fn dataset(data: &DataArgs) -> Dataset {
    let (ds, _) = load_dataset(&data.to_data_config());
    ds
}

fn serve(config: Config) {
    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| fail(e));
    if let Err(e) = runtime.block_on(autoproposta::server::start(config)) {
        fail(e);
    }
}

fn search(args: &SearchArgs) {
    let spec = args.query().into_spec().unwrap_or_else(|e| fail(e));
    let ds = dataset(&args.data);
    let matched: Vec<Vehicle> = filter(&ds.vehicles, &spec);

    eprintln!("  {} of {} vehicles match", matched.len(), ds.vehicles.len());
    for v in &matched {
        eprintln!(
            "  {:>3}  {:<24} {:>4}  {:>12}  {}, {}",
            v.id,
            v.title(),
            v.year,
            format_price(v.price),
            v.location.city,
            v.location.state,
        );
    }
    print_json(&matched);
}

fn cities(state: &str) {
    let resolver = LocationResolver::builtin();
    if resolver.tree().state(state).is_none() {
        let known: Vec<&str> = resolver.tree().states.iter().map(|s| s.abbreviation.as_str()).collect();
        fail(format!("Unknown state '{}'. Known: {}.", state, known.join(", ")));
    }
    eprintln!("  {}", state_display_name(state));
    print_json(&resolver.cities_for(state));
}

fn regions(state: &str, city: &str) {
    let resolver = LocationResolver::builtin();
    if resolver.tree().city(state, city).is_none() {
        fail(format!("Unknown city '{}' in state '{}'.", city, state));
    }
    print_json(&resolver.regions_for(state, city));
}

fn stats(data: &DataArgs) {
    let ds = dataset(data);
    print_json(&StatsReport {
        dashboard: dashboard_stats(&ds.vehicles, &ds.proposals),
        sales_by_make: sales_by_make(&ds.vehicles),
        proposals_by_model: proposals_by_model(&ds.vehicles, &ds.proposals),
    });
}

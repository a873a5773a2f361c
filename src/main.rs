//! thermolog
//!
//! Command-line utility maintaining a catalog of temperature sensors and
//! their historical readings.

use anyhow::Result;
use clap::Parser;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use thermolog::cli::{AddSensorCommand, Cli, Command, OutputFormat};
use thermolog::db::Database;
use thermolog::format::{GroupListing, SensorEntry, format_listing_json, format_listing_text, format_reading};
use thermolog::sensor::ReadContext;
use thermolog::settings::Settings;
use thermolog::types::SensorKind;
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

/// Default main configuration file, next to the working directory.
const DEFAULT_CONFIG: &str = "thermolog.yaml";
/// Defaults tier, consulted when an option is absent from the main file.
const DEFAULT_DEFAULTS: &str = "thermolog.defaults.yaml";

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new().create(true).append(true).open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    let config_path = cli.config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let defaults_path = cli.defaults.or_else(|| {
        let p = PathBuf::from(DEFAULT_DEFAULTS);
        p.exists().then_some(p)
    });
    debug!(config = %config_path.display(), "loading configuration");
    let settings = Settings::load(&config_path, defaults_path.as_ref())?;

    let connection = settings.string("connection")?;
    let echo_sql = settings.bool("debug/echosql")?;

    match cli.command {
        Command::Init { yes } => run_init(&connection, echo_sql, yes),
        Command::List { format } => run_list(&connection, echo_sql, format.unwrap_or_default()),
        Command::AddGroup {
            name,
            description,
            yes,
        } => run_add_group(&connection, echo_sql, &name, description.as_deref(), yes),
        Command::AddSensor { kind } => run_add_sensor(&connection, echo_sql, kind),
        Command::Regroup {
            sensor_id,
            group,
            yes,
        } => run_regroup(&connection, echo_sql, sensor_id, group, yes),
        Command::Read {
            sensor_id,
            save,
            yes,
        } => run_read(&connection, echo_sql, sensor_id, save, yes),
        Command::Readings { sensor_id } => run_readings(&connection, echo_sql, sensor_id),
    }
}

/// Resolve a yes/no decision: `--yes` short-circuits, otherwise prompt.
fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    print!("{} [y/n] ", prompt);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

fn run_init(connection: &str, echo_sql: bool, yes: bool) -> Result<()> {
    let exists = std::path::Path::new(connection).exists();
    if !exists {
        let prompt = format!("Create database at '{}'?", connection);
        if !confirm(&prompt, yes)? {
            println!("Aborted.");
            return Ok(());
        }
    }

    let (_db, report) = Database::open_with_report(connection, echo_sql)?;
    let applied = report.applied_migrations();
    if applied.is_empty() {
        println!("No schema changes to apply.");
    } else {
        for migration in applied {
            println!("Applied {}", migration);
        }
        println!("Done.");
    }
    Ok(())
}

fn run_list(connection: &str, echo_sql: bool, format: OutputFormat) -> Result<()> {
    let db = Database::open(connection, echo_sql)?;
    let ctx = ReadContext::new()?;

    let mut listings = Vec::new();
    for group in db.list_groups()? {
        let sensors = db.sensors_in_group(group.id)?;
        listings.push(GroupListing {
            group: Some(group),
            sensors: probe_all(&ctx, sensors)?,
        });
    }
    listings.push(GroupListing {
        group: None,
        sensors: probe_all(&ctx, db.ungrouped_sensors()?)?,
    });

    match format {
        OutputFormat::Text => print!("{}", format_listing_text(&listings)),
        OutputFormat::Json => println!("{}", format_listing_json(&listings)?),
    }
    Ok(())
}

/// Run the availability probe for each sensor in turn.
fn probe_all(
    ctx: &ReadContext,
    sensors: Vec<thermolog::types::Sensor>,
) -> Result<Vec<SensorEntry>> {
    let mut entries = Vec::with_capacity(sensors.len());
    for sensor in sensors {
        let available = sensor.available(ctx)?;
        entries.push(SensorEntry { sensor, available });
    }
    Ok(entries)
}

fn run_add_group(
    connection: &str,
    echo_sql: bool,
    name: &str,
    description: Option<&str>,
    yes: bool,
) -> Result<()> {
    if !confirm(&format!("Add group '{}'?", name), yes)? {
        println!("Aborted.");
        return Ok(());
    }

    let db = Database::open(connection, echo_sql)?;
    let group = db.add_group(name, description)?;
    info!(group_id = group.id, name = %group.name, "group added");
    println!("Added group '{}' with id {}", group.name, group.id);
    Ok(())
}

fn run_add_sensor(connection: &str, echo_sql: bool, command: AddSensorCommand) -> Result<()> {
    let (kind, name, description, group, yes) = match command {
        AddSensorCommand::Accuweather {
            loc_code,
            name,
            description,
            group,
            yes,
        } => (
            SensorKind::Accuweather { loc_code },
            name,
            description,
            group,
            yes,
        ),
        AddSensorCommand::W1therm {
            family,
            hardware_id,
            name,
            description,
            group,
            yes,
        } => (
            SensorKind::W1Therm {
                family,
                hardware_id,
            },
            name,
            description,
            group,
            yes,
        ),
    };

    let display_name = name.clone().unwrap_or_else(|| kind.default_name());
    if !confirm(&format!("Add {} sensor '{}'?", kind.tag(), display_name), yes)? {
        println!("Aborted.");
        return Ok(());
    }

    let db = Database::open(connection, echo_sql)?;
    let sensor = db.add_sensor(name.as_deref(), description.as_deref(), group, kind)?;
    info!(sensor_id = sensor.id, name = %sensor.name, kind = sensor.kind.tag(), "sensor added");
    println!("Added sensor '{}' with id {}", sensor.name, sensor.id);
    Ok(())
}

fn run_regroup(
    connection: &str,
    echo_sql: bool,
    sensor_id: i64,
    group: Option<i64>,
    yes: bool,
) -> Result<()> {
    let db = Database::open(connection, echo_sql)?;
    let sensor = db.get_sensor(sensor_id)?;

    let prompt = match group {
        Some(gid) => {
            let target = db.get_group(gid)?;
            format!("Move sensor '{}' to group '{}'?", sensor.name, target.name)
        }
        None => format!("Remove sensor '{}' from its group?", sensor.name),
    };
    if !confirm(&prompt, yes)? {
        println!("Aborted.");
        return Ok(());
    }

    let sensor = db.set_sensor_group(sensor_id, group)?;
    info!(sensor_id, group_id = ?sensor.group_id, "sensor regrouped");
    match sensor.group_id {
        Some(gid) => println!("Sensor '{}' is now in group {}", sensor.name, gid),
        None => println!("Sensor '{}' is now ungrouped", sensor.name),
    }
    Ok(())
}

fn run_read(connection: &str, echo_sql: bool, sensor_id: i64, save: bool, yes: bool) -> Result<()> {
    let db = Database::open(connection, echo_sql)?;
    let sensor = db.get_sensor(sensor_id)?;
    let ctx = ReadContext::new()?;

    let reading = sensor.read(&ctx)?;
    println!("{}: {}", sensor.name, format_reading(&reading));

    if !save {
        // Dry run: the reading stays transient.
        return Ok(());
    }

    if !confirm(&format!("Save reading for sensor '{}'?", sensor.name), yes)? {
        println!("Discarded.");
        return Ok(());
    }

    let saved = db.insert_reading(&reading)?;
    info!(sensor_id, reading_id = ?saved.id, value = saved.value, "reading saved");
    println!("Saved.");
    Ok(())
}

fn run_readings(connection: &str, echo_sql: bool, sensor_id: i64) -> Result<()> {
    let db = Database::open(connection, echo_sql)?;
    let sensor = db.get_sensor(sensor_id)?;

    let readings = db.readings_for_sensor(sensor_id)?;
    println!("{}:", sensor.name);
    if readings.is_empty() {
        println!("    None");
        return Ok(());
    }
    for reading in &readings {
        println!("    {}", format_reading(reading));
    }
    Ok(())
}

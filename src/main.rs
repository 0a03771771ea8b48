//! Dry-run bring-up: runs the full driver lifecycle against a logging
//! transport and prints what would reach the sensor.

use std::path::PathBuf;

use clap::Parser;
use ovc4cam::{
    imx219, Board, BoardProfile, ControlChannel, DryRunClock, DryRunResetLine, DryRunTransport,
    ModeId, Ovc4Sensor, Released, SensorControls, SensorOps, StdDelay,
};

type DrySensor = Ovc4Sensor<DryRunTransport, DryRunResetLine, StdDelay>;
type DryParts = Released<DryRunTransport, DryRunResetLine, StdDelay>;

#[derive(Debug, Parser)]
#[command(name = "ovc4cam", about = "Dry-run the OVC4 sensor bring-up sequence")]
struct Args {
    /// Board profile (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Mode index to program.
    #[arg(long, default_value_t = 0)]
    mode: u32,

    /// Gain value to publish on the control channel.
    #[arg(long, default_value_t = 128)]
    gain: i64,
}

fn main() {
    env_logger::init();

    if let Err(err) = run(&Args::parse()) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> ovc4cam::Result<()> {
    let profile = match &args.config {
        Some(path) => BoardProfile::load(path)?,
        None => BoardProfile::default(),
    };

    let sensor = bring_up(&profile)?;
    if let Some(path) = sensor.channel().path() {
        println!("Control channel: {}", path.display());
    }
    println!("Sensor: {}", sensor.identity());

    let (result, released) = drive(sensor, args);

    println!("Register writes: {}", released.transport.writes().len());
    match &released.reset {
        Some(reset) => println!(
            "Reset gpio {}: {} level changes, left {:?}",
            reset.gpio(),
            reset.levels().len(),
            reset.levels().last()
        ),
        None => println!("Reset gpio: not wired"),
    }
    result
}

fn bring_up(profile: &BoardProfile) -> ovc4cam::Result<DrySensor> {
    let catalog = imx219::catalog(profile.modes.expected_count)?;
    let channel = ControlChannel::create(&profile.control.dir, profile.sensor.id)?;

    let reset = profile.board.reset_gpio.map(DryRunResetLine::new);
    let mut board = Board::new(DryRunTransport::new(), reset, StdDelay);
    board.assert_reset_on_power_off = profile.board.assert_reset_on_power_off;
    if let Some(name) = &profile.board.mclk {
        println!("Master clock: {name}");
        board.clock = Some((name.clone(), Box::new(DryRunClock::new(name.clone()))));
    }

    Ovc4Sensor::probe(board, &profile.sensor_config(), catalog, channel)
}

/// Run the streaming steps, then tear down whether or not they succeeded.
fn drive(mut sensor: DrySensor, args: &Args) -> (ovc4cam::Result<()>, DryParts) {
    let result = exercise(&mut sensor, args);
    if let Err(err) = &result {
        log::error!("dry run aborted: {err}");
    }
    (result, sensor.remove())
}

fn exercise(sensor: &mut DrySensor, args: &Args) -> ovc4cam::Result<()> {
    let mode = ModeId::new(args.mode);
    let descriptor = sensor.catalog().descriptor(mode)?.clone();
    sensor.set_mode(mode)?;
    sensor.start_streaming()?;
    sensor.set_gain(args.gain)?;
    sensor.stop_streaming()?;

    println!(
        "Mode {mode}: {}x{} @ {:?} fps",
        descriptor.width, descriptor.height, descriptor.frame_rates
    );
    let record = sensor.channel().snapshot()?;
    println!(
        "Control record: gain={} exposure={} sensor_id={}",
        record.gain, record.exposure, record.sensor_id
    );
    Ok(())
}

//! vocana-inspect - 离线检查 Vocana 驱动
//!
//! 不需要 coreaudiod：直接构造 [`Driver`]，打印对象图、属性值，
//! 或模拟若干个 IO 周期并输出统计。

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use vocana_hal::audio::timing::now_ticks;
use vocana_hal::config::load_config;
use vocana_hal::driver::constants::{fourcc_to_string, AudioObjectID};
use vocana_hal::driver::object::{self, Direction, K_OBJECT_ID_DEVICE};
use vocana_hal::driver::{
    ClientInfo, Driver, IoCycleInfo, IoOperation, PropertyAddress, PropertyValue,
};

/// Vocana HAL plug-in inspector
#[derive(Parser)]
#[command(name = "vocana-inspect")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Driver config file (default: system location, then built-in defaults)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the object graph
    Tree,

    /// List every property of an object
    Props {
        /// Object ID (1 = plug-in, 2 = box, 3 = device, 4-9 = streams and controls)
        object: AudioObjectID,
    },

    /// Run simulated IO cycles and print the stats report
    Simulate {
        /// Number of IO clients to start
        #[arg(long, default_value = "1")]
        clients: u32,

        /// Number of IO cycles
        #[arg(long, default_value = "100")]
        cycles: u64,

        /// Frames per cycle
        #[arg(long, default_value = "512")]
        frames: u32,

        /// Sleep one buffer duration between cycles
        #[arg(long)]
        realtime: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let config = load_config(cli.config.as_deref()).context("failed to load driver config")?;
    let driver = Driver::new(config);
    driver.initialize(None)?;

    match cli.command {
        Commands::Tree => show_tree(&driver),
        Commands::Props { object } => show_properties(&driver, object)?,
        Commands::Simulate {
            clients,
            cycles,
            frames,
            realtime,
        } => simulate(&driver, clients, cycles, frames, realtime)?,
    }

    Ok(())
}

/// 打印对象图
fn show_tree(driver: &Driver) {
    println!("=== {} ({}) ===\n", driver.config().device_name, driver.format());
    print_children(0, 0);
}

fn print_children(owner: AudioObjectID, depth: usize) {
    for node in object::children(owner) {
        println!(
            "{:indent$}[{}] {:<10} class={} owner={}",
            "",
            node.id,
            node.kind.label(),
            fourcc_to_string(node.kind.class()),
            node.owner,
            indent = depth * 2
        );
        print_children(node.id, depth + 1);
    }
}

/// 列出一个对象的全部属性
fn show_properties(driver: &Driver, object: AudioObjectID) -> anyhow::Result<()> {
    let table = driver
        .property_table(object)
        .with_context(|| format!("no object with ID {}", object))?;

    println!("=== Object {} ({} properties) ===\n", object, table.len());
    for entry in table {
        let address = PropertyAddress::global(entry.selector);
        let flag = if entry.is_settable() { "rw" } else { "r " };

        let size = match driver.get_property_data_size(object, &address, None) {
            Ok(size) => size,
            Err(e) => {
                println!("{} {} <{}>", fourcc_to_string(entry.selector), flag, e);
                continue;
            }
        };
        let value = driver
            .get_property_data(object, &address, None, size)
            .map(|v| describe(&v))
            .unwrap_or_else(|e| format!("<{}>", e));
        println!("{} {} {:>4}B  {}", fourcc_to_string(entry.selector), flag, size, value);
    }
    Ok(())
}

fn describe(value: &PropertyValue) -> String {
    match value {
        PropertyValue::U32(v) if *v > 0xFFFF => format!("{} ({})", v, fourcc_to_string(*v)),
        PropertyValue::U32(v) => v.to_string(),
        PropertyValue::F32(v) => format!("{:.3}", v),
        PropertyValue::F64(v) => format!("{:.3}", v),
        PropertyValue::String(s) => format!("{:?}", s),
        PropertyValue::ObjectList(ids) => format!("{:?}", ids),
        PropertyValue::ChannelPair(pair) => format!("{:?}", pair),
        PropertyValue::ValueRange(range) => format!("[{}, {}]", range.minimum, range.maximum),
        PropertyValue::RangeList(ranges) => ranges
            .iter()
            .map(|r| format!("{}", r.minimum))
            .collect::<Vec<_>>()
            .join(", "),
        PropertyValue::Format(asbd) => format!(
            "{} Hz, {} ch, {} bit, {} B/frame",
            asbd.sample_rate, asbd.channels_per_frame, asbd.bits_per_channel, asbd.bytes_per_frame
        ),
        PropertyValue::FormatList(formats) => format!("{} formats", formats.len()),
    }
}

/// 模拟 HAL 的 IO 周期
fn simulate(
    driver: &Driver,
    clients: u32,
    cycles: u64,
    frames: u32,
    realtime: bool,
) -> anyhow::Result<()> {
    let bytes = driver
        .io_buffer_len(K_OBJECT_ID_DEVICE, object::stream_id(Direction::Input), frames)
        .with_context(|| format!("invalid frame count {}", frames))?;
    let format = driver.format();
    let cycle_duration = Duration::from_secs_f64(frames as f64 / format.sample_rate as f64);

    for client_id in 1..=clients {
        let client = ClientInfo {
            client_id,
            process_id: std::process::id() as i32,
            is_native_endian: true,
            bundle_id: Some("com.vocana.inspect".to_string()),
        };
        driver.add_device_client(K_OBJECT_ID_DEVICE, &client)?;
        driver.start_io(K_OBJECT_ID_DEVICE, client_id)?;
    }

    let timestamp = driver.get_zero_timestamp(K_OBJECT_ID_DEVICE)?;
    println!(
        "Zero timestamp: sample={} host={} seed={}",
        timestamp.sample_time, timestamp.host_time, timestamp.seed
    );

    let mut input = vec![0u8; bytes];
    let mut output = vec![0u8; bytes];
    for counter in 0..cycles {
        let cycle = IoCycleInfo {
            cycle_counter: counter,
            nominal_frame_count: frames,
            current_host_time: now_ticks(),
        };

        for (operation, direction, buffer) in [
            (IoOperation::ReadInput, Direction::Input, &mut input),
            (IoOperation::WriteMix, Direction::Output, &mut output),
        ] {
            let stream = object::stream_id(direction);
            driver.begin_io_operation(K_OBJECT_ID_DEVICE, 1, operation, frames, &cycle)?;
            driver.do_io_operation(
                K_OBJECT_ID_DEVICE,
                stream,
                1,
                operation,
                frames,
                Some(buffer.as_mut_slice()),
            )?;
            driver.end_io_operation(K_OBJECT_ID_DEVICE, 1, operation, frames, &cycle)?;
        }

        if realtime {
            thread::sleep(cycle_duration);
        }
    }

    let report = driver.stats().report(frames, format.sample_rate);
    for client_id in 1..=clients {
        driver.stop_io(K_OBJECT_ID_DEVICE, client_id)?;
    }

    println!("\n=== IO Stats ({}) ===", format);
    println!("{}", report);
    if report.interval_stats.avg_ns > 0 {
        println!(
            "Expected sampled interval: {:.3}ms, max jitter: {:.3}ms",
            report.expected_sampled_interval_ns as f64 / 1e6,
            report.max_jitter_ns() as f64 / 1e6
        );
    }
    Ok(())
}

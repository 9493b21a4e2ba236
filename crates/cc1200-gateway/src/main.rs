//! Run the gateway on a Raspberry Pi with up to four CC1200 modules.
//!
//! Received packets are written to the RX pipe as fixed-size records;
//! records written to the TX pipe are transmitted on the module they name.
//! Missing pipes are created at startup and removed again on exit.

use std::{fmt::Debug, path::PathBuf, sync::Arc, thread, time::Duration};

use anyhow::{anyhow, Error, Result};
use clap::Parser;
use log::LevelFilter;

use cc1200::radio::{DEFAULT_SETTINGS, CC1200};
use cc1200_gateway::{
    linux::{BoardHardware, Delay, EdgeLine, ModuleDevice},
    CreatedPipes, Gateway, GatewayConfig, PipeSink, PipeSource,
};

fn debug_err(err: impl Debug) -> Error {
    anyhow!("{err:?}")
}

#[derive(Debug, Parser)]
#[command(version, about = "Bridge CC1200 transceivers to a pair of named pipes")]
struct Args {
    /// Module slots to use, in range [1, 4].
    #[arg(short, long, value_delimiter = ',', default_values_t = vec![1, 2, 3, 4])]
    modules: Vec<u8>,

    /// Channel of each module in `--modules` order, in range [0, 30].
    #[arg(short, long, value_delimiter = ',')]
    channels: Vec<u8>,

    #[arg(long, default_value = "/tmp/sfb_rxfifo")]
    rx_pipe: PathBuf,

    #[arg(long, default_value = "/tmp/sfb_txfifo")]
    tx_pipe: PathBuf,

    /// Number of the /dev/gpiochip device.
    #[arg(long, default_value_t = 0)]
    gpio_chip: u8,

    /// Number of the /dev/spidev bus.
    #[arg(long, default_value_t = 0)]
    spi_bus: u8,

    /// Packets buffered per module.
    #[arg(long, default_value_t = 32)]
    queue_depth: usize,

    /// Milliseconds to wait after each transmission.
    #[arg(long, default_value_t = 75)]
    tx_holdoff: u64,

    /// Don't wait on the SO line after asserting a chip select.
    #[arg(long)]
    no_ready_line: bool,

    /// Print each module's configuration after bring-up.
    #[arg(long)]
    print_details: bool,
}

impl Args {
    fn to_config(&self) -> GatewayConfig {
        let mut config = GatewayConfig::default().with_modules(&self.modules);
        for (number, channel) in self.modules.iter().zip(self.channels.iter()) {
            config = config.with_channel(*number, *channel);
        }
        config.rx_pipe = self.rx_pipe.clone();
        config.tx_pipe = self.tx_pipe.clone();
        config.gpio_chip = self.gpio_chip;
        config.spi_bus = self.spi_bus;
        config.queue_depth = self.queue_depth;
        config.tx_holdoff = Duration::from_millis(self.tx_holdoff);
        if self.no_ready_line {
            config.ready_line = None;
        }
        config
    }
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let config = args.to_config();
    if config.modules.is_empty() {
        return Err(anyhow!("No module slots selected"));
    }

    let mut board = BoardHardware::new(config.gpio_chip)?;
    let shared = board.share_bus(config.spi_bus, config.spi_speed_hz, config.ready_line)?;
    let mut gateway: Gateway<ModuleDevice, Delay> =
        Gateway::new(config.queue_depth, config.tx_holdoff);
    let mut lines: Vec<(u8, EdgeLine)> = Vec::with_capacity(config.modules.len());
    for module in &config.modules {
        let device = board.get_module_device(shared.clone(), module.cs_line)?;
        gateway.add_module(module, CC1200::new(device, Delay))?;
        lines.push((module.number, board.get_irq_line(module.irq_line)?));
    }

    let mut reset = board.get_reset_pin(config.reset_line)?;
    let errors = gateway.bring_up(&mut reset, &mut Delay, DEFAULT_SETTINGS)?;
    if errors > 0 {
        log::warn!("{errors} register(s) failed verification during bring-up");
    }
    if args.print_details {
        for module in gateway.modules() {
            module.print_details()?;
        }
    }

    let pipes = Arc::new(CreatedPipes::create(&[&config.rx_pipe, &config.tx_pipe])?);
    let gateway = Arc::new(gateway);
    // edge workers exit with the process
    let _workers = gateway.start_listening(lines)?;

    {
        let gateway = gateway.clone();
        let pipes = pipes.clone();
        ctrlc::set_handler(move || {
            gateway.shutdown();
            pipes.remove();
            std::process::exit(0);
        })
        .map_err(debug_err)?;
    }

    {
        let gateway = gateway.clone();
        let tx_pipe = config.tx_pipe.clone();
        thread::Builder::new()
            .name("outbound".into())
            .spawn(move || {
                let mut source = PipeSource::new(tx_pipe);
                while gateway.is_running() {
                    if let Err(e) = gateway.run_outbound(&mut source) {
                        log::error!("Outbound: {e}");
                        thread::sleep(Duration::from_secs(1));
                    }
                }
            })?;
    }

    log::info!(
        "Forwarding to {} and transmitting from {}",
        config.rx_pipe.display(),
        config.tx_pipe.display()
    );
    let mut sink = PipeSink::new(&config.rx_pipe);
    gateway.run_inbound(&mut sink);
    pipes.remove();
    Ok(())
}

//! Modbus TCP 寄存器模拟器：D802..=D896（步长 2）随机取值，定时随机变化。

use plc_config::SimulatorConfig;
use plc_protocol::simulator::{self, RegisterBank};
use plc_telemetry::init_tracing;
use rand_core::{OsRng, RngCore};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{debug, info, warn};

const FIRST_REGISTER: u16 = 802;
const LAST_REGISTER: u16 = 896;
/// 每次变化时被改写的寄存器比例（百分比）
const MUTATE_PERCENT: u32 = 30;

fn random_value(rng: &mut impl RngCore) -> u16 {
    // 100..=999
    100 + (rng.next_u32() % 900) as u16
}

fn seed_registers(bank: &RegisterBank, rng: &mut impl RngCore) -> usize {
    let mut count = 0;
    for address in (FIRST_REGISTER..=LAST_REGISTER).step_by(2) {
        bank.set(address, random_value(rng));
        count += 1;
    }
    count
}

fn mutate_registers(bank: &RegisterBank, rng: &mut impl RngCore) -> usize {
    let mut changed = 0;
    for address in bank.addresses() {
        if rng.next_u32() % 100 < MUTATE_PERCENT {
            bank.set(address, random_value(rng));
            changed += 1;
        }
    }
    changed
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = SimulatorConfig::from_env()?;
    init_tracing();

    let addr: SocketAddr = config.listen_addr.parse()?;
    let bank = RegisterBank::new();
    let mut rng = OsRng;
    let seeded = seed_registers(&bank, &mut rng);
    let (local, server) = simulator::spawn(bank.clone(), addr).await?;
    info!(target: "plc.protocol", addr = %local, registers = seeded, "simulator_started");

    let mut ticker = tokio::time::interval(Duration::from_millis(config.tick_ms.max(1)));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let changed = mutate_registers(&bank, &mut rng);
                debug!(target: "plc.protocol", changed, "simulator_registers_mutated");
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(err) = signal {
                    warn!(target: "plc.protocol", error = %err, "shutdown_signal_failed");
                }
                break;
            }
        }
    }
    server.abort();
    info!(target: "plc.protocol", "simulator_stopped");
    Ok(())
}

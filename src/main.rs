use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mm_tables::codec::crc::{crc16, unstamp_with_seed};
use mm_tables::table::layout::card_layout;
use mm_tables::util::hex::dump_hex;
use mm_tables::{
    call_type_to_string, catalog, convert_card_table, init_logger, log_info, store, CardTable,
    CarrierTable, DlogTable, LcdTable, Revision, DLOG_MT_CARRIER_TABLE_EXP,
};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mm-tables")]
#[command(about = "Inspect, edit and convert payphone terminal DLOG tables")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the known tables and their sizes
    Tables,
    /// Show (and optionally provision) a carrier table
    Carrier {
        input: PathBuf,
        #[arg(short, long, value_enum, default_value = "mtr2")]
        revision: Revision,
        /// Install the standard carriers C0..C9
        #[arg(long)]
        provision: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Show a card table
    Card {
        input: PathBuf,
        #[arg(short, long, value_enum, default_value = "mtr2")]
        revision: Revision,
        #[arg(long)]
        json: bool,
    },
    /// Convert a card table between firmware revisions
    ConvertCard {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, value_enum, default_value = "mtr2")]
        from: Revision,
        #[arg(long, value_enum, default_value = "mtr1")]
        to: Revision,
    },
    /// Show an NPA-NXX table; the encoding follows the file size
    Lcd {
        input: PathBuf,
        #[arg(short, long, value_parser = parse_byte, default_value = "0x88")]
        table: u8,
        /// Hex dump instead of the rate grid
        #[arg(long)]
        raw: bool,
        #[arg(long)]
        json: bool,
    },
    /// Print or verify the CRC-16 of a file
    Checksum {
        input: PathBuf,
        #[arg(short, long, value_parser = parse_u16, default_value = "0")]
        seed: u16,
        /// Treat the last two bytes as a stored little-endian checksum
        #[arg(long)]
        verify: bool,
    },
    /// Render a call type byte
    CallType {
        #[arg(value_parser = parse_byte)]
        byte: u8,
    },
    /// Hex dump a file
    Dump { input: PathBuf },
}

fn parse_u16(s: &str) -> Result<u16, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("{s}: {e}"))
}

fn parse_byte(s: &str) -> Result<u8, String> {
    let value = parse_u16(s)?;
    u8::try_from(value).map_err(|_| format!("{s}: does not fit in a byte"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    init_logger();

    let cli = Cli::parse();

    match cli.command {
        Commands::Tables => {
            println!("{:<6} {:<12} {:>8} {:>8}  Description", "Id", "Name", "MTR 1.x", "MTR 2.x");
            for info in catalog::all_tables() {
                let size = |revision: Revision| {
                    info.payload_len(revision)
                        .map(|len| len.to_string())
                        .unwrap_or_else(|_| "-".to_string())
                };
                println!(
                    "0x{:02x}   {:<12} {:>8} {:>8}  {}",
                    info.id,
                    info.name,
                    size(Revision::Mtr1),
                    size(Revision::Mtr2),
                    info.description
                );
            }
        }
        Commands::Carrier {
            input,
            revision,
            provision,
            output,
            json,
        } => {
            let mut table: CarrierTable = store::load(&input, DLOG_MT_CARRIER_TABLE_EXP, revision)
                .with_context(|| format!("loading carrier table {}", input.display()))?;

            if provision {
                table.provision_standard();
                log_info("Provisioned standard carriers C0..C9");
            }

            if let Some(path) = output {
                store::save(&path, &table)
                    .with_context(|| format!("writing {}", path.display()))?;
            }

            if json {
                print_json(&table)?;
            } else {
                print!("{table}");
            }
        }
        Commands::Card {
            input,
            revision,
            json,
        } => {
            let table_id = card_layout(revision).table_id;
            let table: CardTable = store::load(&input, table_id, revision)
                .with_context(|| format!("loading card table {}", input.display()))?;

            if json {
                print_json(&table)?;
            } else {
                print!("{table}");
            }
        }
        Commands::ConvertCard {
            input,
            output,
            from,
            to,
        } => {
            let src = store::read_table_file(&input, card_layout(from).table_id, from)
                .with_context(|| format!("loading card table {}", input.display()))?;
            let converted = convert_card_table(&src, from, to)?;
            store::write_table_file(&output, &converted)
                .with_context(|| format!("writing {}", output.display()))?;
            println!(
                "Converted {} ({} bytes) to {} ({} bytes)",
                from,
                src.len(),
                to,
                converted.len()
            );
        }
        Commands::Lcd {
            input,
            table,
            raw,
            json,
        } => {
            let bytes = fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
            let lcd = LcdTable::detect(table, &bytes)
                .with_context(|| format!("decoding {}", input.display()))?;

            if raw {
                println!("{}", dump_hex(&lcd.encode()));
            } else if json {
                print_json(&lcd)?;
            } else {
                println!(
                    "{} ({:?}), NPA {}",
                    catalog::name_of(table)?,
                    lcd.encoding,
                    lcd.npa
                );
                print!("{lcd}");
            }
        }
        Commands::Checksum {
            input,
            seed,
            verify,
        } => {
            let bytes = fs::read(&input).with_context(|| format!("reading {}", input.display()))?;

            if verify {
                let stamped = unstamp_with_seed(seed, &bytes)?;
                println!(
                    "stored 0x{:04x}, calculated 0x{:04x} over {} bytes",
                    stamped.stored,
                    stamped.calculated,
                    stamped.payload.len()
                );
                stamped.check()?;
                println!("OK");
            } else {
                println!("0x{:04x}", crc16(seed, &bytes));
            }
        }
        Commands::CallType { byte } => {
            println!("{}", call_type_to_string(byte, 64)?);
        }
        Commands::Dump { input } => {
            let bytes = fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
            println!("{}", dump_hex(&bytes));
        }
    }

    Ok(())
}

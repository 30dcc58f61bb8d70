use ar4ja::ldpc::{
    expand_compact, generate, generate_all, pack_generator, pack_parity_check,
    parity_check, render_hex_words, render_memory_table, unpunctured_generator, verify_generator, FirmwareSizes, SparseIndex,
};
use ar4ja::{telemetry, CodeParameters, GeneratedCode, GeneratorConfig, LdpcError, MatrixStore, Rate, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{error, info, warn};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// TOML file with a [generator] section
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the configured output directory
    #[clap(short, long, global = true)]
    out: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone, Copy)]
struct CodeArgs {
    /// Information block length (1024, 4096 or 16384)
    #[clap(short, long, default_value_t = 1024)]
    k: usize,

    /// Code rate (1/2, 2/3 or 4/5)
    #[clap(short, long, default_value = "1/2", value_parser = parse_rate)]
    rate: Rate,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generates H and G for the configured codes and stores them
    Generate {
        /// Generate codes concurrently
        #[clap(long)]
        parallel: bool,

        /// Skip the H * G^T check
        #[clap(long)]
        no_verify: bool,

        /// Regenerate codes already in the store
        #[clap(long)]
        force: bool,

        /// Print the Prometheus metrics when done
        #[clap(long)]
        metrics: bool,
    },
    /// Prints the compact generator constants of a code
    Consts {
        #[clap(flatten)]
        code: CodeArgs,
    },
    /// Prints the sparse parity-check tables of a code
    Sparse {
        #[clap(flatten)]
        code: CodeArgs,

        #[clap(long, value_enum, default_value = "text")]
        format: Format,
    },
    /// Prints the dense parity-check matrix of a code as 32-bit words
    Hparity {
        #[clap(flatten)]
        code: CodeArgs,
    },
    /// Prints the firmware RAM requirements of every code
    Sizes,
    /// Regenerates a code and checks it against the stored matrices
    Check {
        #[clap(flatten)]
        code: CodeArgs,
    },
}

fn parse_rate(s: &str) -> std::result::Result<Rate, String> {
    s.parse().map_err(|e: LdpcError| e.to_string())
}

fn load_config(cli: &Cli) -> Result<GeneratorConfig> {
    let mut cfg = match &cli.config {
        Some(path) => GeneratorConfig::from_file(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(out) = &cli.out {
        cfg.output_dir = out.clone();
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Loads a code from the store, generating and saving it when missing.
fn obtain(store: &MatrixStore, params: &CodeParameters, verify: bool) -> Result<GeneratedCode> {
    if store.contains(params) {
        return store.load(params);
    }
    info!("{}: not in {}, generating", params, store.dir().display());
    let code = generate(params, verify)?;
    store.save(&code)?;
    Ok(code)
}

fn run_generate(cfg: &GeneratorConfig, store: &MatrixStore, force: bool) -> Result<()> {
    let pending: Vec<CodeParameters> = cfg
        .codes
        .iter()
        .filter(|p| force || !store.contains(p))
        .copied()
        .collect();
    if pending.len() < cfg.codes.len() {
        info!("{} codes already stored, use --force to regenerate", cfg.codes.len() - pending.len());
    }

    let started = Instant::now();
    let mut failed = 0;
    for result in generate_all(&pending, cfg.verify, cfg.parallel) {
        match result.and_then(|code| store.save(&code)) {
            Ok(path) => println!("{}", path.display()),
            Err(e) => {
                error!("{}", e);
                failed += 1;
            }
        }
    }
    info!("generated {} codes in {:?}", pending.len() - failed, started.elapsed());
    if failed > 0 {
        return Err(LdpcError::InvalidParameter(format!("{} of {} codes failed", failed, pending.len())));
    }
    Ok(())
}

fn run_check(store: &MatrixStore, params: &CodeParameters) -> Result<()> {
    let h = parity_check(params)?;
    let g_full = unpunctured_generator(&h, params)?;
    verify_generator(&h, &g_full, params)?;
    println!("{}: H * G^T == 0", params);

    let code = obtain(store, params, true)?;
    if code.parity_check != h || code.generator != g_full.columns(0..params.n())? {
        return Err(LdpcError::CorruptStore {
            path: store.path_for(params).display().to_string(),
            reason: "stored matrices differ from a fresh derivation".into(),
        });
    }
    println!("{}: stored matrices match", params);

    let packed = pack_generator(&code.generator, params.k(), params.circulant_size())?;
    let expanded = expand_compact(&packed, params.k(), params.n(), params.circulant_size())?;
    if expanded != code.parity_block()? {
        return Err(LdpcError::InvalidParameter(format!("{}: compact generator does not expand back", params)));
    }
    println!("{}: {} compact words expand to the parity block", params, packed.len());

    let sparse = SparseIndex::from_matrix(&code.parity_check)?;
    if sparse.rows_to_dense()? != code.parity_check || sparse.cols_to_dense()? != code.parity_check {
        return Err(LdpcError::InvalidParameter(format!("{}: sparse tables do not rebuild H", params)));
    }
    println!("{}: sparse tables rebuild H ({} edges)", params, sparse.edges());
    Ok(())
}

fn print_sparse(sparse: &SparseIndex, format: Format, per_line: usize) -> Result<()> {
    match format {
        Format::Json => match sparse.to_u16() {
            Ok(narrow) => println!("{}", serde_json::to_string_pretty(&narrow)?),
            Err(e) => {
                warn!("{}, emitting 32-bit tables", e);
                println!("{}", serde_json::to_string_pretty(sparse)?);
            }
        },
        Format::Text => {
            let tables = [
                ("ci", &sparse.check_cols),
                ("cs", &sparse.check_row_starts),
                ("vi", &sparse.data_rows),
                ("vs", &sparse.data_col_starts),
            ];
            for (name, values) in tables {
                println!("{} ({} entries):", name, values.len());
                for chunk in values.chunks(per_line.max(1) * 2) {
                    let line: Vec<String> = chunk.iter().map(|v| v.to_string()).collect();
                    println!("    {},", line.join(", "));
                }
            }
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let cfg = load_config(&cli)?;
    let store = MatrixStore::new(&cfg.output_dir);

    match cli.command {
        Commands::Generate {
            parallel,
            no_verify,
            force,
            metrics,
        } => {
            let cfg = GeneratorConfig {
                parallel: cfg.parallel || parallel,
                verify: cfg.verify && !no_verify,
                ..cfg
            };
            let result = run_generate(&cfg, &store, force);
            if metrics {
                telemetry::update_memory_usage();
                print!("{}", telemetry::gather_text()?);
            }
            result?;
        }
        Commands::Consts { code } => {
            let params = CodeParameters::new(code.k, code.rate)?;
            let generated = obtain(&store, &params, cfg.verify)?;
            let words = pack_generator(&generated.generator, params.k(), params.circulant_size())?;
            println!("/* {} compact generator, b={} */", params, params.circulant_size());
            println!("{}", render_hex_words(&words, cfg.words_per_line));
        }
        Commands::Sparse { code, format } => {
            let params = CodeParameters::new(code.k, code.rate)?;
            // H alone is cheap, no need for the generator
            let h = parity_check(&params)?;
            print_sparse(&SparseIndex::from_matrix(&h)?, format, cfg.words_per_line)?;
        }
        Commands::Hparity { code } => {
            let params = CodeParameters::new(code.k, code.rate)?;
            let words = pack_parity_check(&parity_check(&params)?)?;
            println!("/* {} parity-check matrix, {} words */", params, words.len());
            println!("{}", render_hex_words(&words, cfg.words_per_line));
        }
        Commands::Sizes => {
            let mut sizes = Vec::with_capacity(cfg.codes.len());
            for params in &cfg.codes {
                let edges = parity_check(params)?.count_ones();
                sizes.push(FirmwareSizes::new(params, edges));
            }
            print!("{}", render_memory_table(&sizes));
        }
        Commands::Check { code } => {
            let params = CodeParameters::new(code.k, code.rate)?;
            run_check(&store, &params)?;
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

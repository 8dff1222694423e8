pub mod cli;
pub mod cmd;
pub mod error;
pub mod format;
pub mod io;

pub use cli::{Cli, Command, OutputFormat, PathOrStdin};

use clap::Parser;

fn main() {
    #[cfg(unix)]
    install_sigpipe_default();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = dispatch(&cli);

    if let Err(e) = result {
        eprintln!("{}", e.message());
        std::process::exit(e.exit_code());
    }
}

/// Dispatches the parsed CLI arguments to the appropriate command handler.
///
/// Returns `Ok(())` on success or a [`error::CliError`] on failure. The
/// caller is responsible for printing the error message and exiting with the
/// appropriate exit code.
fn dispatch(cli: &Cli) -> Result<(), error::CliError> {
    match &cli.command {
        Command::Agglomerate {
            volume,
            threshold,
            priority_mode,
            connectivity,
            nozeros,
            remove_inclusions,
            output,
        } => cmd::agglomerate::run(
            volume,
            cli.max_file_size,
            *threshold,
            *priority_mode,
            *connectivity,
            *nozeros,
            *remove_inclusions,
            output.as_deref(),
        ),

        Command::Ucm {
            volume,
            priority_mode,
            connectivity,
            output,
        } => cmd::ucm::run(volume, cli.max_file_size, *priority_mode, *connectivity, output.as_deref()),

        Command::Inspect { volume } => cmd::inspect::run(volume, cli.max_file_size, &cli.format),

        Command::Init { example } => cmd::init::run(*example),

        Command::Train {
            experiment_name,
            prob_map,
            ground_truth,
            learning_mode,
            labeling_mode,
            priority_mode,
            num_epochs,
            max_num_epochs,
            min_num_examples,
            num_examples,
            no_memory,
            no_unique,
            no_learn_flat: _,
            feature_manager: _,
            active_vi,
            active_vi_beta,
            single_channel: _,
            no_channel_data: _,
            remove_inclusions,
            nozeros,
            watershed_file: _,
            synapse_file: _,
            synapse_dilation: _,
            seed_cc_threshold: _,
            output_dir,
            training_data_extension,
            classifier_extension: _,
            seed,
        } => cmd::train::run(cmd::train::TrainArgs {
            experiment_name,
            prob_map,
            ground_truth,
            max_file_size: cli.max_file_size,
            learning_mode: *learning_mode,
            labeling_mode: *labeling_mode,
            priority_mode: *priority_mode,
            num_epochs: *num_epochs,
            max_num_epochs: *max_num_epochs,
            min_num_examples: *min_num_examples,
            num_examples: *num_examples,
            memory: !*no_memory,
            unique: !*no_unique,
            active_vi: *active_vi,
            active_vi_beta: *active_vi_beta,
            remove_inclusions: *remove_inclusions,
            nozeros: *nozeros,
            output_dir,
            training_data_extension,
            seed: *seed,
            verbose: cli.verbose,
        }),
    }
}

/// Resets `SIGPIPE` to its default disposition (`SIG_DFL`).
///
/// Rust's runtime ignores `SIGPIPE` by default, which causes programs that
/// write to a closed pipe (e.g. `ragseg inspect volume.json | head`) to
/// receive an `Err(BrokenPipe)` from a write call rather than being
/// terminated silently. By restoring the default disposition, the kernel
/// will terminate the process with exit code 0 (consistent with standard
/// Unix behavior) when a write to a closed pipe occurs.
///
/// This function uses `libc::signal` which requires the `libc` crate. It is
/// only compiled on Unix targets via `#[cfg(unix)]` at the call site.
#[cfg(unix)]
fn install_sigpipe_default() {
    // SAFETY: signal() is safe to call during single-threaded program
    // initialization before any other threads are spawned. SIG_DFL is a valid
    // handler for SIGPIPE. The return value (previous handler) is discarded.
    //
    // The workspace denies `unsafe_code` globally, but this is the minimal
    // unavoidable use of libc required for SIGPIPE handling on Unix. There is
    // no safe Rust equivalent in the standard library.
    //
    // We use an inline allow rather than a workspace-level exception so the
    // scope of the unsafe block is as narrow as possible.
    #[allow(unsafe_code)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docuhub — command-line entry point.

mod cli;
mod commands;
mod services;

use clap::Parser;
use docuhub_core::error::DocuhubError;
use docuhub_core::human_errors::humanize_error;

use crate::cli::{Cli, Commands};
use crate::commands::WatermarkOverrides;
use crate::services::AppServices;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli.command) {
        tracing::error!(error = %format!("{err:#}"), "command failed");
        report(&err);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    let mut services = AppServices::init()?;

    match command {
        Commands::Merge { inputs, output } => commands::merge_cmd(&mut services, &inputs, &output),
        Commands::Split {
            input,
            pages,
            output,
        } => commands::split_cmd(&mut services, &input, &pages, &output),
        Commands::Compress {
            input,
            target,
            output,
        } => commands::compress_cmd(&mut services, &input, target.as_deref(), &output),
        #[cfg(feature = "render")]
        Commands::Redact {
            input,
            rects,
            erase,
            scale,
            output,
        } => commands::redact_cmd(&mut services, &input, &rects, &erase, scale, &output),
        Commands::Protect {
            input,
            user_password,
            owner_password,
            output,
        } => commands::protect_cmd(
            &mut services,
            &input,
            &user_password,
            owner_password.as_deref(),
            &output,
        ),
        Commands::Watermark {
            input,
            text,
            font_size,
            gray,
            rotation,
            output,
        } => commands::watermark_cmd(
            &mut services,
            &input,
            WatermarkOverrides {
                text,
                font_size,
                gray,
                rotation,
            },
            &output,
        ),
        Commands::PageNumbers {
            input,
            format,
            position,
            start_at,
            output,
        } => commands::page_numbers_cmd(&mut services, &input, format, position, start_at, &output),
        Commands::ToPdf { input, output } => {
            commands::to_pdf_cmd(&mut services, &input, output.as_deref())
        }
        Commands::Metadata { input, json } => commands::metadata_cmd(&mut services, &input, json),
        #[cfg(feature = "ocr")]
        Commands::Ocr {
            input,
            models,
            output,
        } => commands::ocr_cmd(&mut services, &input, models.as_deref(), output.as_deref()),
        Commands::Recent { remove, deleted } => commands::recent_cmd(&services, remove, deleted),
        Commands::Tools => commands::tools_cmd(&services),
    }
}

/// Print a failure once, in plain language when it is a known error.
fn report(err: &anyhow::Error) {
    match err.downcast_ref::<DocuhubError>() {
        Some(known) => {
            let human = humanize_error(known);
            eprintln!("error: {}", human.message);
            eprintln!("  {}", human.suggestion);
        }
        None => eprintln!("error: {err:#}"),
    }
}

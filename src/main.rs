// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod app;
mod config;
mod headless;
mod navigation;
mod ui;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use eframe::egui;
use log::info;

use app::MonitorApp;
use config::AppConfig;

/// Wake up sleeping web services and watch them come online
#[derive(Parser, Debug)]
#[command(name = "wakeup-monitor", version, about)]
struct Args {
    /// Load configuration from this file instead of the per-user location
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Check every server once, print a report and exit (0 if all online)
    #[arg(long)]
    headless: bool,

    /// With --headless, open every main page once all servers are online
    #[arg(long, requires = "headless")]
    open_when_ready: bool,

    /// Print the configuration file path and exit
    #[arg(long)]
    print_config_path: bool,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.print_config_path {
        println!("{}", AppConfig::config_path(args.config.as_deref())?.display());
        return Ok(ExitCode::SUCCESS);
    }

    let config = AppConfig::load_from(args.config.as_deref())?;
    let runtime = tokio::runtime::Runtime::new()?;

    if args.headless {
        let all_online = runtime.block_on(headless::run(&config, args.open_when_ready))?;
        return Ok(if all_online { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }

    // Poller and ticker tasks are spawned from the UI thread
    let _guard = runtime.enter();

    info!("Starting Server Status Monitor...");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([720.0, 560.0])
            .with_title("Server Status Monitor"),
        ..Default::default()
    };

    eframe::run_native(
        "Server Status Monitor",
        options,
        Box::new(move |cc| {
            info!("Creating application...");
            let app: Box<dyn eframe::App> = Box::new(MonitorApp::new(cc, &config)?);
            Ok(app)
        }),
    )?;

    Ok(ExitCode::SUCCESS)
}

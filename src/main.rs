use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod constants;
mod config;

mod domain {
    pub mod columns;
    pub mod entities {
        pub mod chart;
        pub mod enrollment;
        pub mod query;
    }
}

mod infra {
    pub mod chart {
        pub mod fonts;
        pub mod render;
        pub mod theme;
    }
    pub mod import {
        pub mod csv;
        pub mod rows;
        pub mod xlsx;
    }
    pub mod sqlite {
        pub mod queries;
        pub mod repo;
        pub mod schema;
    }
}

mod usecase {
    pub mod ports {
        pub mod repo;
    }
    pub mod services {
        pub mod chart_service;
        pub mod import_service;
        pub mod query_service;
    }
}

mod platform {
    pub mod blocking;
}

mod http {
    pub mod error;
    pub mod handlers;
    pub mod routes;
}

mod ui {
    pub mod pages;
    pub mod styles;
}

mod client {
    pub mod api;
    pub mod filters;
    pub mod retry;
    pub mod state;
    pub mod store;
}

mod commands {
    pub mod browse;
    pub mod import;
    pub mod serve;
}


use config::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve(args) => commands::serve::run(args).await,
        Command::Import(args) => commands::import::run(args),
        Command::Browse(args) => commands::browse::run(args).await,
    }
}

//! tapestry init command implementation
//!
//! Creates the data directory, a default config and the starting periods.
//! Existing files are left alone.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{Config, CONFIG_FILE};
use crate::error::{Error, Result};
use crate::organizer::Organizer;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::storage::{ANALYTICS_KEY, PERIODS_KEY};

use super::load_context;

pub struct InitOptions {
    pub data_dir: Option<PathBuf>,
    pub output: OutputOptions,
}

#[derive(Serialize)]
struct InitReport {
    data_dir: PathBuf,
    created: InitCreated,
}

#[derive(Serialize)]
struct InitCreated {
    data_dir: bool,
    config: bool,
    periods: bool,
}

pub fn run(options: InitOptions) -> Result<()> {
    let ctx = load_context(options.data_dir.as_deref())?;
    let data_dir = ctx.data_dir.clone();

    let created_dir = !data_dir.exists();
    ctx.store.init()?;
    let created_config = ensure_config(&data_dir)?;

    let needs_state = !ctx.store.contains(PERIODS_KEY)? || !ctx.store.contains(ANALYTICS_KEY)?;
    if needs_state {
        let mut organizer = Organizer::open(ctx.store, ctx.config)?;
        organizer.save()?;
    }

    let report = InitReport {
        data_dir: data_dir.clone(),
        created: InitCreated {
            data_dir: created_dir,
            config: created_config,
            periods: needs_state,
        },
    };

    let mut created_items = Vec::new();
    if created_dir {
        created_items.push("data dir");
    }
    if created_config {
        created_items.push(CONFIG_FILE);
    }
    if needs_state {
        created_items.push("default periods");
    }

    let header = if created_items.is_empty() {
        "tapestry init: nothing to do".to_string()
    } else {
        "tapestry init: initialized".to_string()
    };

    let mut human = HumanOutput::new(header);
    human.field("data dir", data_dir.display().to_string());
    human.field(
        "created",
        if created_items.is_empty() {
            "none".to_string()
        } else {
            created_items.join(", ")
        },
    );
    human.hint("tapestry task add morning \"<title>\"");

    emit_success(options.output, "init", &report, Some(&human))
}

fn ensure_config(data_dir: &Path) -> Result<bool> {
    let config_path = data_dir.join(CONFIG_FILE);
    if config_path.exists() {
        if !config_path.is_file() {
            return Err(Error::OperationFailed(format!(
                "{CONFIG_FILE} exists but is not a file: {}",
                config_path.display()
            )));
        }
        return Ok(false);
    }

    Config::default().save(&config_path)?;
    Ok(true)
}

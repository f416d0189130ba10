//! tapestry session command implementations.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::session::{Session, User};

use super::load_context;

pub struct SessionOptions {
    pub data_dir: Option<PathBuf>,
    pub output: OutputOptions,
}

#[derive(Serialize)]
struct SessionReport {
    signed_in: bool,
    user: Option<User>,
}

pub fn run_sign_in(options: SessionOptions) -> Result<()> {
    let mut store = load_context(options.data_dir.as_deref())?.store;
    let mut session = Session::load(&mut store)?;
    let user = session.sign_in(&mut store)?.clone();

    let mut human = HumanOutput::new(format!("tapestry session sign-in: {}", user.name));
    human.field("email", user.email.clone());
    human.field("id", user.id.clone());

    let report = SessionReport {
        signed_in: true,
        user: Some(user),
    };
    emit_success(options.output, "session sign-in", &report, Some(&human))
}

pub fn run_sign_out(options: SessionOptions) -> Result<()> {
    let mut store = load_context(options.data_dir.as_deref())?.store;
    let mut session = Session::load(&mut store)?;
    let was_signed_in = session.sign_out(&mut store)?;

    let header = if was_signed_in {
        "tapestry session sign-out: signed out"
    } else {
        "tapestry session sign-out: not signed in"
    };
    let human = HumanOutput::new(header);

    let report = SessionReport {
        signed_in: false,
        user: None,
    };
    emit_success(options.output, "session sign-out", &report, Some(&human))
}

pub fn run_show(options: SessionOptions) -> Result<()> {
    let mut store = load_context(options.data_dir.as_deref())?.store;
    let session = Session::load(&mut store)?;
    let user = session.user().cloned();

    let mut human = match &user {
        Some(user) => {
            let mut human = HumanOutput::new(format!("tapestry session: {}", user.name));
            human.field("email", user.email.clone());
            human.field("id", user.id.clone());
            human
        }
        None => {
            let mut human = HumanOutput::new("tapestry session: not signed in");
            human.hint("tapestry session sign-in");
            human
        }
    };
    if let Some(avatar) = user.as_ref().and_then(|user| user.avatar.clone()) {
        human.field("avatar", avatar);
    }

    let report = SessionReport {
        signed_in: session.is_signed_in(),
        user,
    };
    emit_success(options.output, "session show", &report, Some(&human))
}

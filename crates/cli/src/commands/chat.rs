use std::io::{self, BufRead, Write};

use glidedesk_agent::session::resolve_session;
use glidedesk_agent::{build_runtime, RuntimeDeps};
use glidedesk_core::config::{AppConfig, LoadOptions};
use glidedesk_core::SupportRequest;

use super::CommandResult;

/// Interactive terminal chat against an in-process support runtime (noop
/// model, fixture OCR). Type `exit` to quit.
pub fn run(user_id: String) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("chat", "config_validation", error.to_string(), 2)
        }
    };

    let async_runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build()
    {
        Ok(async_runtime) => async_runtime,
        Err(error) => {
            return CommandResult::failure("chat", "runtime_init", error.to_string(), 1)
        }
    };

    let support = match build_runtime(&config, RuntimeDeps::in_memory(&config)) {
        Ok(support) => support,
        Err(error) => {
            return CommandResult::failure("chat", "runtime_construction", error.to_string(), 1)
        }
    };

    let session = match async_runtime.block_on(resolve_session(
        support.sessions.as_ref(),
        &support.app_name,
        &user_id,
        None,
    )) {
        Ok(session) => session,
        Err(error) => {
            return CommandResult::failure("chat", "session_resolution", error.to_string(), 1)
        }
    };

    println!(
        "GlideDesk support chat for user {user_id} (session {}). Type 'exit' to quit.",
        session.session_id
    );

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text.eq_ignore_ascii_case("exit") {
            break;
        }

        let request = SupportRequest::with_text(user_id.as_str(), text);
        let response = async_runtime.block_on(support.orchestrator.dispatch(&request));
        println!("[{}] {}", response.agent, response.text);
        if let Some(next_action) = response.next_action {
            println!("(next: {})", next_action.as_str());
        }
    }

    CommandResult::success("chat", "chat session ended")
}

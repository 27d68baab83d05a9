// terminal chat client

mod app;
mod breathing;
mod event;
mod theme;
mod ui;

pub use app::{App, Session};
pub use breathing::{Breathing, Phase, Tick, Ticker};
pub use theme::ThemeKind;

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::Error;
use crate::core::{Backend, ChatStore, Message, RelayResponse, Role};
use app::LogLevel;
use event::{Action, handle_event, poll_event};

type Reply = Result<RelayResponse, Error>;

pub async fn run(session: Session, backend: Backend, store: Option<ChatStore>) -> Result<(), Error> {
    if session.current_user().is_none() {
        return Err(Error::NotSignedIn);
    }

    // setup terminal
    enable_raw_mode().map_err(|e| Error::Server(e.to_string()))?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen).map_err(|e| Error::Server(e.to_string()))?;
    let backend_term = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend_term).map_err(|e| Error::Server(e.to_string()))?;

    let mut app = App::new(session, backend.describe());

    // run app
    let result = run_app(&mut terminal, &mut app, Arc::new(backend), store.as_ref()).await;

    // the breathing timers go with the app state
    app.quit();

    // restore terminal
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    if let Some(store) = store {
        store.close().await;
    }

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    backend: Arc<Backend>,
    store: Option<&ChatStore>,
) -> Result<(), Error> {
    match store {
        Some(store) => match store.history(app.user()).await {
            Ok(rows) => {
                let count = rows.len();
                app.load_history(rows);
                app.log(LogLevel::Ok, format!("loaded {count} messages"));
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not load history");
                app.log(LogLevel::Warn, format!("could not load history: {e}"));
            }
        },
        None => app.log(LogLevel::Info, "history is not saved".to_string()),
    }

    // replies come back over a channel so the loop keeps drawing and
    // reading keys while one is pending
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut pending: Option<JoinHandle<()>> = None;

    loop {
        while let Ok(reply) = rx.try_recv() {
            settle(app, store, reply).await;
        }

        app.tick(Instant::now());

        terminal
            .draw(|frame| ui::render(frame, app))
            .map_err(|e| Error::Server(e.to_string()))?;

        if let Some(event) =
            poll_event(Duration::from_millis(100)).map_err(|e| Error::Server(e.to_string()))?
        {
            match handle_event(app, event) {
                Action::Quit => break,
                Action::SignOut => {
                    app.sign_out();
                }
                Action::Send(text) => {
                    save(app, store, Role::User, &text).await;
                    pending = Some(dispatch(backend.clone(), app.conversation(), tx.clone()));
                }
                Action::ClearHistory => {
                    clear_history(app, store).await;
                }
                Action::None => {}
            }
        }

        if !app.running {
            break;
        }
    }

    // leaving with a reply in flight drops it
    if let Some(task) = pending {
        task.abort();
    }

    Ok(())
}

fn dispatch(
    backend: Arc<Backend>,
    conversation: Vec<Message>,
    tx: mpsc::UnboundedSender<Reply>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let reply = backend.send(&conversation).await;
        // receiver gone means the app already quit
        let _ = tx.send(reply);
    })
}

// apply a finished relay call to the screen and the store
async fn settle(app: &mut App, store: Option<&ChatStore>, reply: Reply) {
    match reply {
        Ok(response) => {
            let text = response.message.clone();
            app.receive(response);
            save(app, store, Role::Assistant, &text).await;
        }
        Err(e) => app.fail(&e),
    }
}

// a failed save never blocks the conversation
async fn save(app: &mut App, store: Option<&ChatStore>, role: Role, content: &str) {
    let Some(store) = store else {
        return;
    };

    let saved = store.insert(app.user(), role, content).await;
    if let Err(e) = saved {
        tracing::warn!(error = %e, %role, "could not save message");
        app.log(LogLevel::Warn, format!("could not save {role} message: {e}"));
    }
}

async fn clear_history(app: &mut App, store: Option<&ChatStore>) {
    if let Some(store) = store {
        let cleared = store.clear(app.user()).await;
        match cleared {
            Ok(n) => app.log(LogLevel::Ok, format!("deleted {n} saved messages")),
            Err(e) => {
                app.fail(&e);
                return;
            }
        }
    }
    app.clear_history();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GatewayConfig, Relay};

    fn app() -> App {
        App::with_theme(Session::new("ana"), "test".to_string(), ThemeKind::Dusk)
    }

    fn send(app: &mut App, text: &str) -> String {
        for c in text.chars() {
            app.insert_char(c);
        }
        app.submit().unwrap()
    }

    fn reply(text: &str) -> Reply {
        Ok(RelayResponse {
            message: text.to_string(),
            is_crisis: false,
        })
    }

    #[tokio::test]
    async fn test_reply_kept_when_store_fails() {
        let store = ChatStore::connect("sqlite::memory:").await.unwrap();
        store.close().await;

        let mut app = app();
        let text = send(&mut app, "hello");
        save(&mut app, Some(&store), Role::User, &text).await;
        settle(&mut app, Some(&store), reply("I'm here")).await;

        assert!(!app.loading);
        assert_eq!(
            app.conversation(),
            vec![Message::user("hello"), Message::assistant("I'm here")]
        );
        let warnings = app.logs.iter().filter(|l| l.level == LogLevel::Warn).count();
        assert_eq!(warnings, 2);
        assert!(app.notice.is_none());
    }

    #[tokio::test]
    async fn test_send_flow_persists_both_sides() {
        let store = ChatStore::connect("sqlite::memory:").await.unwrap();

        let mut app = app();
        let text = send(&mut app, "hello");
        save(&mut app, Some(&store), Role::User, &text).await;
        settle(&mut app, Some(&store), reply("I'm here")).await;

        let rows = store.history("ana").await.unwrap();
        let saved: Vec<Message> = rows.iter().map(|r| r.to_message()).collect();
        assert_eq!(saved, app.conversation());
    }

    #[tokio::test]
    async fn test_dispatch_returns_over_channel() {
        let backend = Arc::new(Backend::Local(Relay::new(GatewayConfig::new(None))));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut app = app();
        send(&mut app, "hello");
        dispatch(backend, app.conversation(), tx);

        // the app stays usable while the call is out
        app.insert_char('x');
        assert_eq!(app.input, "x");
        assert!(app.loading);

        let result = rx.recv().await.unwrap();
        assert!(matches!(result, Err(Error::MissingApiKey)));

        settle(&mut app, None, result).await;
        assert!(!app.loading);
        assert_eq!(app.messages.len(), 1);
        assert!(app.notice.is_some());
    }

    #[tokio::test]
    async fn test_clear_history_empties_store_and_screen() {
        let store = ChatStore::connect("sqlite::memory:").await.unwrap();

        let mut app = app();
        let text = send(&mut app, "hello");
        save(&mut app, Some(&store), Role::User, &text).await;
        settle(&mut app, Some(&store), reply("I'm here")).await;

        clear_history(&mut app, Some(&store)).await;
        assert!(app.messages.is_empty());
        assert!(store.history("ana").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_requires_user() {
        let backend = Backend::Local(Relay::new(GatewayConfig::new(None)));
        let result = run(Session::new("  "), backend, None).await;
        assert!(matches!(result, Err(Error::NotSignedIn)));
    }
}

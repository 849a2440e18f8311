mod hotkey;
mod keymap;
mod ui;
mod update;
mod windowing;

use std::cell::Cell;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use iced::{widget, Task};
use smilecore_catalog::Catalog;
use smilecore_config::SettingValue;
use smilecore_picker::{KeyPress, Modifiers, Picker, Stores};
use smilecore_shell::{Activations, DesktopShell, Instance};
use tracing::{info, warn};

use hotkey::GlobalShortcut;

const WINDOW_WIDTH: f32 = 420.0;
const WINDOW_HEIGHT: f32 = 480.0;
const POLL_INTERVAL: Duration = Duration::from_millis(50);
const TOAST_DURATION: Duration = Duration::from_secs(1);
const HOTKEY_RETRY_DELAY: Duration = Duration::from_millis(1200);

#[derive(Parser, Debug)]
#[command(name = "smile", version)]
#[command(about = "Emoji picker with custom tags and usage history")]
struct Args {
    /// Keep the window hidden until the shortcut or a second launch shows it
    #[arg(long)]
    start_hidden: bool,

    #[arg(long, default_value = "info")]
    log_level: String,

    /// Read emoji data from this file instead of the bundled catalog
    #[arg(long)]
    catalog: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub(crate) enum Message {
    QueryChanged(String),
    EmojiPressed(usize),
    CategoryPressed(usize),
    VariantChosen { hexcode: String, variant: usize },
    KeyPressed(KeyPress),
    ModifiersChanged(Modifiers),
    CloseRequested,
    PollExternal,
    OpenSettings,
    CloseOverlay,
    TagDraftChanged(String),
    TagDraftSubmitted,
    SettingChanged(SettingValue),
    HotkeyDraftChanged(String),
    HotkeySubmitted,
    EditCustomTags(String),
    CustomTagsDraftChanged(String),
    SaveCustomTags,
    DeleteCustomTags(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Overlay {
    SkinTones(String),
    TagEditor { hexcode: String, draft: String },
    Shortcuts,
    Settings {
        editing: Option<TagEdit>,
        /// Listed once when the page opens.
        locales: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TagEdit {
    hexcode: String,
    draft: String,
}

pub(crate) struct App {
    picker: Picker,
    shell: DesktopShell,
    activations: Option<Activations>,
    shortcut: Option<GlobalShortcut>,
    shortcut_retry_at: Option<Instant>,
    visible: bool,
    overlay: Option<Overlay>,
    toast: Option<(String, Instant)>,
    hotkey_draft: String,
    search_input_id: widget::Id,
    tag_input_id: widget::Id,
    grid_scroll_id: widget::Id,
}

impl App {
    fn boot(
        catalog: Arc<Catalog>,
        activations: Option<Activations>,
        start_hidden: bool,
    ) -> (Self, Task<Message>) {
        let stores = Stores::open(
            &smilecore_config::config_dir(),
            &smilecore_config::data_dir().join("locales"),
        );
        let picker = Picker::new(catalog, stores);

        let (shortcut, shortcut_retry_at) = match GlobalShortcut::register(&picker.settings().hotkey) {
            Ok(shortcut) => (Some(shortcut), None),
            Err(err) => {
                warn!(%err, "global shortcut unavailable");
                (None, Some(Instant::now() + HOTKEY_RETRY_DELAY))
            }
        };

        let mut app = Self {
            hotkey_draft: picker.settings().hotkey.clone(),
            picker,
            shell: DesktopShell::new(),
            activations,
            shortcut,
            shortcut_retry_at,
            visible: false,
            overlay: None,
            toast: None,
            search_input_id: widget::Id::new("search-input"),
            tag_input_id: widget::Id::new("tag-input"),
            grid_scroll_id: widget::Id::new("emoji-grid"),
        };

        let task = if start_hidden {
            info!("started hidden");
            Task::none()
        } else {
            app.present()
        };

        (app, task)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    info!("starting smile v{}", env!("CARGO_PKG_VERSION"));

    let activations = match smilecore_shell::claim_or_activate() {
        Ok(Instance::Primary(activations)) => Some(activations),
        Ok(Instance::AlreadyRunning) => return Ok(()),
        Err(err) => {
            warn!(%err, "running without single instance support");
            None
        }
    };

    let catalog = Arc::new(match &args.catalog {
        Some(path) => Catalog::from_path(path)?,
        None => Catalog::bundled()?,
    });
    info!(emojis = catalog.len(), "catalog loaded");

    let settings = smilecore_config::SettingsStore::load(
        smilecore_config::config_dir().join(smilecore_config::SETTINGS_FILE),
    );
    let window = windowing::native_window_settings(
        args.start_hidden,
        settings.get().open_on_mouse_position,
    );

    let start_hidden = args.start_hidden;
    let activations = Cell::new(activations);

    iced::application(
        move || App::boot(catalog.clone(), activations.take(), start_hidden),
        update::update,
        ui::view,
    )
    .title("Smile")
    .theme(ui::theme)
    .window(window)
    .subscription(ui::subscription)
    .run()
    .map_err(|err| anyhow::anyhow!("window loop failed: {err}"))
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .init();

    Ok(())
}

//! System tray icon with state-based updates.
//!
//! Manages a tray icon with three states (Idle, Recording, Processing)
//! and a context menu with Reload Settings and Exit. Icons are drawn in
//! code as a filled disc so no image assets ship with the binary; the
//! idle color follows the configured theme.

use crate::{AppError, AppResult, TrayIconState, config::Theme};

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{info, instrument};
use tray_icon::menu::{Menu, MenuId, MenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

/// Icon edge length in pixels.
const ICON_SIZE: u32 = 32;

/// System tray icon manager. Lives on the main thread; `TrayIcon` is
/// `!Send` on all platforms.
pub struct TrayManager {
    tray_icon: TrayIcon,
    theme: Theme,
    reload_item_id: MenuId,
    exit_item_id: MenuId,
}

impl TrayManager {
    /// Create a new tray manager showing the idle state.
    #[track_caller]
    #[instrument]
    pub fn new(theme: Theme) -> AppResult<Self> {
        let menu = Menu::new();

        let reload_item = MenuItem::new("Reload Settings", true, None);
        let exit_item = MenuItem::new("Exit", true, None);

        let reload_id = reload_item.id().clone();
        let exit_id = exit_item.id().clone();

        menu.append(&reload_item).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to add reload menu: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        menu.append(&exit_item).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to add exit menu: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let icon = render_icon(TrayIconState::Idle, theme)?;

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip("Push-Scribe - Ready")
            .with_menu(Box::new(menu))
            .with_icon(icon)
            .build()
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to create tray icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("System tray icon initialized");

        Ok(Self {
            tray_icon,
            theme,
            reload_item_id: reload_id,
            exit_item_id: exit_id,
        })
    }

    /// Update the tray icon state with new icon and tooltip.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn update_state(&mut self, state: TrayIconState) -> AppResult<()> {
        let tooltip = match state {
            TrayIconState::Idle => "Push-Scribe - Ready",
            TrayIconState::Recording => "Push-Scribe - Listening...",
            TrayIconState::Processing => "Push-Scribe - Transcribing...",
        };

        self.tray_icon
            .set_icon(Some(render_icon(state, self.theme)?))
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to update icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.tray_icon
            .set_tooltip(Some(tooltip))
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to update tooltip: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(())
    }

    /// Re-theme the idle icon after a settings reload.
    #[instrument(skip(self))]
    pub fn set_theme(&mut self, theme: Theme) -> AppResult<()> {
        self.theme = theme;
        self.update_state(TrayIconState::Idle)
    }

    /// Get the reload-settings menu item ID.
    pub fn reload_item_id(&self) -> &MenuId {
        &self.reload_item_id
    }

    /// Get the exit menu item ID.
    pub fn exit_item_id(&self) -> &MenuId {
        &self.exit_item_id
    }
}

/// Draw the state icon: a filled disc on a transparent background.
/// Recording is red and Processing amber in both themes; Idle follows
/// the theme so it stays visible on the taskbar.
#[track_caller]
fn render_icon(state: TrayIconState, theme: Theme) -> AppResult<Icon> {
    let color: [u8; 4] = match (state, theme) {
        (TrayIconState::Recording, _) => [0xE5, 0x39, 0x35, 0xFF],
        (TrayIconState::Processing, _) => [0xFB, 0x8C, 0x00, 0xFF],
        (TrayIconState::Idle, Theme::Light) => [0xEC, 0xEF, 0xF1, 0xFF],
        (TrayIconState::Idle, Theme::Dark) => [0x37, 0x47, 0x4F, 0xFF],
    };

    let mut rgba = vec![0u8; (ICON_SIZE * ICON_SIZE * 4) as usize];
    let center = (ICON_SIZE as f32 - 1.0) / 2.0;
    let radius = ICON_SIZE as f32 / 2.0 - 2.0;

    for y in 0..ICON_SIZE {
        for x in 0..ICON_SIZE {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            if (dx * dx + dy * dy).sqrt() <= radius {
                let offset = ((y * ICON_SIZE + x) * 4) as usize;
                rgba[offset..offset + 4].copy_from_slice(&color);
            }
        }
    }

    Icon::from_rgba(rgba, ICON_SIZE, ICON_SIZE).map_err(|e| AppError::ConfigError {
        reason: format!("Failed to create icon from RGBA: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })
}

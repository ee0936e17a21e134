//! メインアプリケーションウィンドウ

use crate::config::AppConfig;
use crate::credentials::provider_for;
use crate::inventory::{apply_location_pairs, apply_updates, UpdateOutcome};
use crate::parser::{extract_pairs, LocationPair, ParsedTables};
use crate::pipeline::scan_text;
use crate::reconcile::UpdateTriple;
use crate::scan::{Scan, ScanKind, SUPPORTED_EXTENSIONS};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use eframe::egui;
use egui::{CentralPanel, RichText, Vec2};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use tokio::runtime::Runtime;

use super::theme::{warehouse_theme, Palette};

/// プレビューの表示モード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// 「商品コード 位置」の組をそのまま書く
    Pairs,
    /// DE / A 表を突き合わせて位置と数量を書く
    Tables,
}

impl Mode {
    /// 表が読めたら突き合わせ、なければペア
    fn for_preview(preview: &ScanPreview) -> Self {
        if preview.tables.is_empty() {
            Mode::Pairs
        } else {
            Mode::Tables
        }
    }
}

/// OCR後のプレビュー
struct ScanPreview {
    pairs: Vec<LocationPair>,
    tables: ParsedTables,
    updates: Vec<UpdateTriple>,
}

/// バックグラウンド処理からの通知
enum UiEvent {
    Scanned(Result<ScanPreview, String>),
    Applied(Result<UpdateOutcome, String>),
}

/// アプリケーション状態
pub struct PalletTrackerApp {
    /// 設定（読み込めなかった場合はエラーメッセージ）
    config: Result<AppConfig, String>,
    /// Tokioランタイム
    runtime: Runtime,
    mode: Mode,
    /// 現在のスキャン
    scan: Option<Scan>,
    preview: Option<ScanPreview>,
    /// 最後の書き込み結果
    outcome: Option<UpdateOutcome>,
    last_applied: Option<DateTime<Local>>,
    /// 処理中かどうか
    is_processing: bool,
    /// ステータスメッセージ
    status: String,
    /// エラーメッセージ
    error: Option<String>,
    event_rx: Receiver<UiEvent>,
    event_tx: Sender<UiEvent>,
}

impl PalletTrackerApp {
    fn new() -> Result<Self> {
        let config = AppConfig::from_env().map_err(|e| e.to_string());
        if let Err(ref e) = config {
            tracing::error!("設定エラー: {}", e);
        }
        Self::with_config(config)
    }

    fn with_config(config: Result<AppConfig, String>) -> Result<Self> {
        let (event_tx, event_rx) = channel();

        Ok(Self {
            config,
            runtime: Runtime::new().context("Tokioランタイムの作成に失敗")?,
            mode: Mode::Tables,
            scan: None,
            preview: None,
            outcome: None,
            last_applied: None,
            is_processing: false,
            status: "Drop a scanned sheet to start".to_string(),
            error: None,
            event_rx,
            event_tx,
        })
    }

    /// スキャンを読み込んでOCRを開始
    fn process_file(&mut self, path: PathBuf) {
        let Ok(config) = self.config.clone() else {
            return;
        };

        let scan = match Scan::read(&path) {
            Ok(scan) => scan,
            Err(e) => {
                self.error = Some(format!("{:#}", e));
                return;
            }
        };

        self.scan = Some(scan.clone());
        self.preview = None;
        self.outcome = None;
        self.error = None;
        self.is_processing = true;
        self.status = format!("Processing {}...", scan.name);

        let event_tx = self.event_tx.clone();

        // バックグラウンドで処理
        self.runtime.spawn(async move {
            let result = async {
                let provider = provider_for(&config.credentials);
                let ocr = provider.ocr_client()?;
                let text = scan_text(&ocr, &scan).await?;
                let tables = ParsedTables::parse(&text);
                let updates = tables.updates();
                anyhow::Ok(ScanPreview {
                    pairs: extract_pairs(&text),
                    tables,
                    updates,
                })
            }
            .await;
            let _ = event_tx.send(UiEvent::Scanned(result.map_err(|e| format!("{:#}", e))));
        });
    }

    /// プレビュー内容をシートに書き込む
    fn apply(&mut self) {
        let (Ok(config), Some(preview)) = (self.config.clone(), self.preview.as_ref()) else {
            return;
        };

        let mode = self.mode;
        let pairs = preview.pairs.clone();
        let updates = preview.updates.clone();
        let event_tx = self.event_tx.clone();

        self.is_processing = true;
        self.status = "Writing to the sheet...".to_string();

        self.runtime.spawn(async move {
            let result = async {
                let provider = provider_for(&config.credentials);
                let sheet = provider.sheet_client(&config.sheet)?;
                match mode {
                    Mode::Pairs => apply_location_pairs(&sheet, &config.columns, &pairs).await,
                    Mode::Tables => apply_updates(&sheet, &config.columns, &updates).await,
                }
            }
            .await;
            let _ = event_tx.send(UiEvent::Applied(result.map_err(|e| format!("{:#}", e))));
        });
    }

    /// 結果を受信
    fn receive_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.is_processing = false;
            match event {
                UiEvent::Scanned(Ok(preview)) => {
                    self.status = format!(
                        "{} pairs, {} DE rows, {} A rows, {} matched",
                        preview.pairs.len(),
                        preview.tables.de_rows.len(),
                        preview.tables.a_rows.len(),
                        preview.updates.len()
                    );
                    self.mode = Mode::for_preview(&preview);
                    self.preview = Some(preview);
                }
                UiEvent::Applied(Ok(outcome)) => {
                    let now = Local::now();
                    self.status = format!(
                        "Inventory updated: {} rows ({})",
                        outcome.updated.len(),
                        now.format("%H:%M:%S")
                    );
                    self.last_applied = Some(now);
                    self.outcome = Some(outcome);
                }
                UiEvent::Scanned(Err(e)) | UiEvent::Applied(Err(e)) => {
                    tracing::error!("{}", e);
                    self.status = "Failed".to_string();
                    self.error = Some(e);
                }
            }
        }
    }

    /// 同じプレビューを二度書き込まない
    fn can_apply(&self) -> bool {
        !self.is_processing
            && self.config.is_ok()
            && self.outcome.is_none()
            && self.entry_count() > 0
    }

    fn entry_count(&self) -> usize {
        match (&self.preview, self.mode) {
            (Some(p), Mode::Pairs) => p.pairs.len(),
            (Some(p), Mode::Tables) => p.updates.len(),
            (None, _) => 0,
        }
    }

    fn show_header(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading(
                RichText::new("📦 Pallet Location Uploader")
                    .size(26.0)
                    .color(Palette::TEXT_PRIMARY),
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let sheet = self.config.as_ref().ok().map(|c| c.sheet.clone());
                if ui
                    .add_enabled(sheet.is_some(), egui::Button::new("🔗 Open sheet"))
                    .clicked()
                {
                    if let Some(sheet) = sheet {
                        let _ = open::that(sheet.url());
                    }
                }
            });
        });

        ui.label(
            RichText::new("Upload scanned sheet (PDF or image) → check → apply updates")
                .size(14.0)
                .color(Palette::TEXT_SECONDARY),
        );
    }

    /// ドロップゾーン。クリックされたらファイル選択
    fn show_drop_zone(&mut self, ui: &mut egui::Ui) {
        let is_hovering = !ui.ctx().input(|i| i.raw.hovered_files.is_empty());

        let response = egui::Frame::new()
            .fill(if is_hovering { Palette::BG_DROP } else { Palette::BG_CARD })
            .stroke(egui::Stroke::new(
                2.0,
                if is_hovering { Palette::ACCENT } else { Palette::BORDER },
            ))
            .corner_radius(12.0)
            .inner_margin(24.0)
            .show(ui, |ui| {
                ui.set_min_size(Vec2::new(ui.available_width(), 110.0));
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new(if is_hovering { "📥" } else { "📄" }).size(40.0));
                    ui.label(
                        RichText::new("Drop a scanned sheet here, or click to choose")
                            .size(16.0)
                            .color(Palette::TEXT_PRIMARY),
                    );
                    ui.label(
                        RichText::new("png, jpg, jpeg, pdf, tiff")
                            .size(12.0)
                            .color(Palette::TEXT_SECONDARY),
                    );
                });
            });

        let clicked = response.response.interact(egui::Sense::click()).clicked();
        if clicked && !self.is_processing {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("Scanned sheet", SUPPORTED_EXTENSIONS)
                .pick_file()
            {
                self.process_file(path);
            }
        }
    }

    fn show_scan(&self, ui: &mut egui::Ui) {
        let Some(scan) = &self.scan else {
            return;
        };

        ui.label(RichText::new(&scan.name).strong().color(Palette::TEXT_PRIMARY));
        if scan.kind == ScanKind::Image {
            ui.add(
                egui::Image::from_bytes(format!("bytes://{}", scan.name), scan.bytes.clone())
                    .max_height(220.0)
                    .fit_to_original_size(1.0),
            );
        }
    }

    fn show_preview(&mut self, ui: &mut egui::Ui) {
        let Some(preview) = &self.preview else {
            return;
        };

        ui.horizontal(|ui| {
            ui.radio_value(&mut self.mode, Mode::Tables, "DE / A tables (location + qty)");
            ui.radio_value(&mut self.mode, Mode::Pairs, "Code / location pairs");
        });

        let empty = match self.mode {
            Mode::Pairs => preview.pairs.is_empty(),
            Mode::Tables => preview.updates.is_empty(),
        };
        if empty {
            ui.label(RichText::new("No entries found.").color(Palette::ERROR));
            return;
        }

        egui::ScrollArea::vertical()
            .max_height(260.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                egui::Grid::new("entries")
                    .striped(true)
                    .num_columns(3)
                    .spacing([24.0, 6.0])
                    .show(ui, |ui| match self.mode {
                        Mode::Pairs => {
                            ui.strong("ProductCode");
                            ui.strong("Location");
                            ui.end_row();
                            for pair in &preview.pairs {
                                ui.label(&pair.product);
                                ui.label(&pair.location);
                                ui.end_row();
                            }
                        }
                        Mode::Tables => {
                            ui.strong("ProductCode");
                            ui.strong("Location");
                            ui.strong("Qty");
                            ui.end_row();
                            for update in &preview.updates {
                                ui.label(&update.product);
                                ui.label(&update.location);
                                ui.label(&update.qty);
                                ui.end_row();
                            }
                        }
                    });
            });
    }

    fn show_outcome(&self, ui: &mut egui::Ui) {
        let Some(outcome) = &self.outcome else {
            return;
        };

        ui.label(
            RichText::new(format!("✓ {} rows updated", outcome.updated.len()))
                .color(Palette::SUCCESS),
        );
        for code in &outcome.skipped {
            ui.label(
                RichText::new(format!("⚠ Code not found: {}", code)).color(Palette::WARNING),
            );
        }
    }
}

impl eframe::App for PalletTrackerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.receive_events();

        // ドロップされたファイルを処理（最初の対応ファイルのみ）
        if !ctx.input(|i| i.raw.dropped_files.is_empty()) {
            let dropped: Option<PathBuf> = ctx.input(|i| {
                i.raw
                    .dropped_files
                    .iter()
                    .filter_map(|f| f.path.clone())
                    .find(|p| Scan::is_supported_path(p))
            });

            match dropped {
                Some(path) if !self.is_processing => self.process_file(path),
                Some(_) => {}
                None => self.status = "Unsupported file type".to_string(),
            }
        }

        // 処理中は再描画を要求
        if self.is_processing {
            ctx.request_repaint();
        }

        CentralPanel::default().show(ctx, |ui| {
            ui.spacing_mut().item_spacing = Vec2::new(8.0, 10.0);

            self.show_header(ui);
            ui.add_space(6.0);

            if let Err(e) = &self.config {
                ui.group(|ui| {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new("⚠").size(22.0).color(Palette::ERROR));
                        ui.label(RichText::new(e).color(Palette::ERROR));
                    });
                });
                ui.add_space(6.0);
            }

            self.show_drop_zone(ui);

            if self.is_processing {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(RichText::new(&self.status).color(Palette::ACCENT));
                });
            }

            if let Some(error) = &self.error {
                ui.label(RichText::new(format!("Error: {}", error)).color(Palette::ERROR));
            }

            ui.columns(2, |columns| {
                self.show_scan(&mut columns[0]);
                self.show_preview(&mut columns[1]);
            });

            ui.add_space(6.0);

            if ui
                .add_enabled(self.can_apply(), egui::Button::new("Apply updates"))
                .clicked()
            {
                self.apply();
            }

            self.show_outcome(ui);

            // ステータスバー
            ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
                let last = self
                    .last_applied
                    .map(|t| format!("  ·  last update {}", t.format("%Y-%m-%d %H:%M")))
                    .unwrap_or_default();
                ui.label(
                    RichText::new(format!("{}{}", self.status, last))
                        .size(12.0)
                        .color(Palette::TEXT_SECONDARY),
                );
            });
        });
    }
}

/// アプリケーションを起動
pub fn run() -> Result<()> {
    let app = PalletTrackerApp::new()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 720.0])
            .with_min_inner_size([700.0, 560.0])
            .with_title("Pallet Location Uploader")
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Pallet Location Uploader",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_style(warehouse_theme());
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("アプリケーションエラー: {}", e))
}

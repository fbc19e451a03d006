use egui::{Color32, RichText};
use serde_json::Value;
use std::time::{Duration, Instant};

use sysquery::config::Config;
use sysquery::{
    AllocatorHeap, ArgumentCoercion, ClockReading, GcReport, Operation, ProcessId, ResourceUsage,
    SystemMemory, SystemQuery,
};

/// One pass over every supported query
#[derive(Default)]
struct Snapshot {
    clock: Option<ClockReading>,
    pid: Option<ProcessId>,
    priority: Option<i32>,
    usage: Option<ResourceUsage>,
    memory: Option<SystemMemory>,
}

/// Main application state for the monitor window
pub struct MonitorApp {
    query: SystemQuery,
    heap: AllocatorHeap,
    coercion: ArgumentCoercion,
    snapshot: Snapshot,
    started_at: Option<ClockReading>,
    last_refresh: Instant,
    refresh_interval: Duration,
    auto_refresh: bool,
    priority_input: String,
    priority_step: i32,
    last_gc: Option<GcReport>,
    error_message: Option<String>,
    success_message: Option<String>,
}

impl MonitorApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, query: SystemQuery, config: &Config) -> Self {
        let started_at = query.high_resolution_clock().ok();
        let mut app = Self {
            query,
            heap: AllocatorHeap,
            coercion: ArgumentCoercion::new(&config.arguments),
            snapshot: Snapshot::default(),
            started_at,
            last_refresh: Instant::now(),
            refresh_interval: Duration::from_millis(config.monitor.refresh_interval_ms),
            auto_refresh: true,
            priority_input: String::new(),
            priority_step: config.monitor.priority_step,
            last_gc: None,
            error_message: None,
            success_message: None,
        };
        app.refresh();
        app
    }

    fn refresh(&mut self) {
        self.error_message = None;

        let clock = match self.query.high_resolution_clock() {
            Ok(reading) => Some(reading),
            Err(e) => {
                self.error_message = Some(format!("Clock read failed: {}", e));
                None
            }
        };

        self.snapshot = Snapshot {
            clock,
            pid: self.query.get_process_id().ok(),
            priority: self.query.process_priority(),
            usage: self.query.process_resource_usage(),
            memory: self.query.system_memory_stats(),
        };
        self.last_refresh = Instant::now();
    }

    fn apply_priority(&mut self, priority: i32) {
        self.success_message = None;
        self.error_message = None;
        if self.query.set_process_priority(priority) {
            self.success_message = Some(format!("Priority set to {}", priority));
        } else {
            self.error_message = Some(format!(
                "Priority {} not applied (lowering the nice value needs privilege)",
                priority
            ));
        }
        self.refresh();
    }

    fn apply_priority_input(&mut self) {
        let arg = Value::String(self.priority_input.trim().to_string());
        match self.coercion.priority(Some(&arg)) {
            Ok(priority) => self.apply_priority(priority),
            Err(e) => self.error_message = Some(e.to_string()),
        }
    }

    fn collect(&mut self) {
        match self.query.force_garbage_collect(&mut self.heap) {
            Ok(report) => {
                self.last_gc = Some(report);
                self.success_message = Some(format!(
                    "Heap after collection: {:.1} KB",
                    report.kilobytes()
                ));
            }
            Err(e) => self.error_message = Some(e.to_string()),
        }
    }

    fn unsupported(ui: &mut egui::Ui) {
        ui.colored_label(Color32::GRAY, "not supported on this platform");
    }

    fn unavailable(ui: &mut egui::Ui) {
        ui.colored_label(Color32::YELLOW, "unavailable");
    }

    fn render_time(&self, ui: &mut egui::Ui) {
        ui.heading("Clock");
        egui::Grid::new("clock_grid").num_columns(2).striped(true).show(ui, |ui| {
            ui.label("Seconds since epoch:");
            match self.snapshot.clock {
                Some(reading) => ui.label(format!("{:.6}", reading.seconds())),
                None => ui.colored_label(Color32::RED, "read failed"),
            };
            ui.end_row();

            ui.label("Monitor uptime:");
            match (self.snapshot.clock, self.started_at) {
                (Some(now), Some(start)) => {
                    ui.label(format!("{:.1} s", now.since(start).as_secs_f64()))
                }
                _ => ui.label("-"),
            };
            ui.end_row();
        });
    }

    fn render_process(&mut self, ui: &mut egui::Ui) {
        ui.heading("Process");
        let supports_pid = self.query.supports(Operation::GetPid);
        let supports_usage = self.query.supports(Operation::ProcessInfo);

        egui::Grid::new("process_grid").num_columns(2).striped(true).show(ui, |ui| {
            ui.label("PID:");
            match self.snapshot.pid {
                Some(pid) => {
                    ui.label(pid.to_string());
                }
                None if supports_pid => Self::unavailable(ui),
                None => Self::unsupported(ui),
            }
            ui.end_row();

            ui.label("Priority (nice):");
            match self.snapshot.priority {
                Some(priority) => {
                    ui.label(priority.to_string());
                }
                None if self.query.supports(Operation::SetPriority) => Self::unavailable(ui),
                None => Self::unsupported(ui),
            }
            ui.end_row();

            match &self.snapshot.usage {
                Some(usage) => {
                    let rows = [
                        ("User time:", format!("{:.3} s", usage.user_time)),
                        ("System time:", format!("{:.3} s", usage.system_time)),
                        ("Peak RSS:", format!("{} KB", usage.max_rss_kb)),
                        ("Major faults:", usage.major_page_faults.to_string()),
                        ("Minor faults:", usage.minor_page_faults.to_string()),
                        ("Voluntary switches:", usage.voluntary_context_switches.to_string()),
                        ("Involuntary switches:", usage.involuntary_context_switches.to_string()),
                    ];
                    for (label, value) in rows {
                        ui.label(label);
                        ui.label(value);
                        ui.end_row();
                    }
                }
                None => {
                    ui.label("Resource usage:");
                    if supports_usage {
                        Self::unavailable(ui)
                    } else {
                        Self::unsupported(ui)
                    }
                    ui.end_row();
                }
            }
        });

        if self.query.supports(Operation::SetPriority) {
            ui.horizontal(|ui| {
                ui.label("Set priority:");
                ui.text_edit_singleline(&mut self.priority_input);
                if ui.button("Apply").clicked() {
                    self.apply_priority_input();
                }
                if let Some(current) = self.snapshot.priority {
                    if ui.button("-").clicked() {
                        self.apply_priority(current.saturating_sub(self.priority_step));
                    }
                    if ui.button("+").clicked() {
                        self.apply_priority(current.saturating_add(self.priority_step));
                    }
                }
            });
        }
    }

    fn render_memory(&mut self, ui: &mut egui::Ui) {
        ui.heading("System memory");
        match &self.snapshot.memory {
            Some(mem) => {
                egui::Grid::new("memory_grid").num_columns(2).striped(true).show(ui, |ui| {
                    let rows = [
                        ("Total RAM:", mem.total_ram),
                        ("Free RAM:", mem.free_ram),
                        ("Used RAM:", mem.used_ram),
                        ("Total swap:", mem.total_swap),
                        ("Free swap:", mem.free_swap),
                    ];
                    for (label, bytes) in rows {
                        ui.label(label);
                        ui.label(format!("{:.1} MB", bytes as f64 / 1024.0 / 1024.0));
                        ui.end_row();
                    }
                });
                if mem.total_ram > 0 {
                    let used = mem.used_ram as f32 / mem.total_ram as f32;
                    ui.add(egui::ProgressBar::new(used).text(format!("{:.0}% used", used * 100.0)));
                }
            }
            None if self.query.supports(Operation::SystemMemory) => Self::unavailable(ui),
            None => Self::unsupported(ui),
        }

        ui.separator();
        ui.heading("Managed heap");
        if self.query.supports(Operation::GcCollect) {
            ui.horizontal(|ui| {
                if ui.button("Collect").clicked() {
                    self.collect();
                }
                if let Some(report) = self.last_gc {
                    ui.label(format!("{:.1} KB live after last collection", report.kilobytes()));
                }
            });
        } else {
            Self::unsupported(ui);
        }
    }
}

impl eframe::App for MonitorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Auto-refresh logic
        if self.auto_refresh && self.last_refresh.elapsed() >= self.refresh_interval {
            self.refresh();
        }

        if self.auto_refresh {
            ctx.request_repaint_after(self.refresh_interval);
        }

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Refresh").clicked() {
                        self.refresh();
                    }
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    ui.checkbox(&mut self.auto_refresh, "Auto Refresh");
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let supported = self.query.capabilities();
                    ui.label(format!(
                        "Operations: {}/{} | Last refresh: {:.1}s ago",
                        supported.len(),
                        Operation::ALL.len(),
                        self.last_refresh.elapsed().as_secs_f32()
                    ));
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(error) = &self.error_message {
                ui.colored_label(Color32::RED, format!("Error: {}", error));
            }
            if let Some(success) = &self.success_message {
                ui.colored_label(Color32::GREEN, format!("Success: {}", success));
            }

            egui::ScrollArea::vertical().show(ui, |ui| {
                self.render_time(ui);
                ui.separator();
                self.render_process(ui);
                ui.separator();
                self.render_memory(ui);
                ui.separator();
                ui.label(RichText::new("Supported operations").strong());
                ui.horizontal_wrapped(|ui| {
                    for op in Operation::ALL {
                        let color = if self.query.supports(op) {
                            Color32::GREEN
                        } else {
                            Color32::GRAY
                        };
                        ui.colored_label(color, op.name());
                    }
                });
            });
        });
    }
}

use egui::{DragValue, Grid};
use prism_scene::{ObjectId, Transform, TransformPatch};

/// What the panel needs to know about the scene this frame.
pub struct PanelView {
    pub objects: Vec<(ObjectId, String, Transform)>,
    pub spinning: bool,
    pub reduced_motion: bool,
    pub frame_rate: Option<f32>,
    pub relay_peer: Option<String>,
}

/// Edits made in the panel, applied after the egui pass.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    Patch(ObjectId, TransformPatch),
    ToggleSpin,
    SetReducedMotion(bool),
}

pub struct Inspector {
    pub open: bool,
    selected: usize,
}

impl Inspector {
    pub fn new() -> Self {
        Self {
            open: true,
            selected: 0,
        }
    }

    pub fn show(&mut self, ctx: &egui::Context, view: &PanelView) -> Vec<PanelAction> {
        let mut actions = Vec::new();
        let mut open = self.open;
        egui::Window::new("Inspector")
            .open(&mut open)
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                self.selected = self.selected.min(view.objects.len().saturating_sub(1));

                if view.objects.len() > 1 {
                    egui::ComboBox::from_label("Object")
                        .selected_text(view.objects[self.selected].1.as_str())
                        .show_ui(ui, |ui| {
                            for (i, (_, label, _)) in view.objects.iter().enumerate() {
                                ui.selectable_value(&mut self.selected, i, label.as_str());
                            }
                        });
                    ui.separator();
                }

                if let Some((id, _, t)) = view.objects.get(self.selected) {
                    transform_grid(ui, *id, t, &mut actions);
                }

                ui.separator();
                let mut spinning = view.spinning;
                if ui.checkbox(&mut spinning, "Spin").changed() {
                    actions.push(PanelAction::ToggleSpin);
                }
                let mut reduced = view.reduced_motion;
                if ui.checkbox(&mut reduced, "Reduced motion").changed() {
                    actions.push(PanelAction::SetReducedMotion(reduced));
                }

                ui.separator();
                ui.horizontal(|ui| {
                    ui.label("Frame rate:");
                    match view.frame_rate {
                        Some(fps) => ui.monospace(format!("{fps:.0} fps")),
                        None => ui.monospace("--"),
                    };
                });
                if let Some(peer) = &view.relay_peer {
                    ui.horizontal(|ui| {
                        ui.label("Relay:");
                        ui.monospace(peer);
                    });
                }
            });
        self.open = open;
        actions
    }
}

fn transform_grid(ui: &mut egui::Ui, id: ObjectId, t: &Transform, actions: &mut Vec<PanelAction>) {
    Grid::new("transform_grid")
        .num_columns(4)
        .spacing([8.0, 4.0])
        .show(ui, |ui| {
            ui.label("Position");
            let mut p = t.position;
            if ui.add(DragValue::new(&mut p.x).speed(0.05).prefix("x ")).changed() {
                actions.push(PanelAction::Patch(id, TransformPatch::default().with_x(p.x)));
            }
            if ui.add(DragValue::new(&mut p.y).speed(0.05).prefix("y ")).changed() {
                actions.push(PanelAction::Patch(id, TransformPatch::default().with_y(p.y)));
            }
            if ui.add(DragValue::new(&mut p.z).speed(0.05).prefix("z ")).changed() {
                actions.push(PanelAction::Patch(id, TransformPatch::default().with_z(p.z)));
            }
            ui.end_row();

            ui.label("Rotation");
            let mut r = t.rotation;
            if ui.drag_angle(&mut r.x).changed() {
                actions.push(PanelAction::Patch(id, TransformPatch::default().with_rx(r.x)));
            }
            if ui.drag_angle(&mut r.y).changed() {
                actions.push(PanelAction::Patch(id, TransformPatch::default().with_ry(r.y)));
            }
            if ui.drag_angle(&mut r.z).changed() {
                actions.push(PanelAction::Patch(id, TransformPatch::default().with_rz(r.z)));
            }
            ui.end_row();

            ui.label("Scale");
            let mut s = t.scale.x;
            if ui
                .add(DragValue::new(&mut s).speed(0.01).range(0.01..=100.0))
                .changed()
            {
                actions.push(PanelAction::Patch(id, TransformPatch::default().with_scale(s)));
            }
            ui.end_row();
        });
}

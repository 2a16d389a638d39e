//! On-screen settings panel.
//!
//! The panel occupies the left portion of the window and edits camera and
//! light parameters live. It is a plain widget model: the event loop feeds it
//! cursor positions and button state, the panel hit-tests its widgets and
//! writes values straight through to the targets. Camera writes always go
//! through the camera's clamping setters, so a slider can never put the
//! camera into an invalid state.
//!
//! Rendering is colored quads only (background, slider tracks and fills,
//! toggle boxes, kind selector, reset button), emitted in normalized device
//! coordinates for the GUI pipeline. Pointer input inside the panel is
//! consumed and never reaches the camera controller.

use crate::{
    camera::Camera,
    pipelines::{
        gui::GuiVertex,
        light::{LightKind, LightSettings},
    },
};

/// Fraction of the window width the panel covers.
const PANEL_WIDTH_RATIO: f32 = 1.0 / 3.5;
const MARGIN: f32 = 12.0;
const ROW_HEIGHT: f32 = 16.0;
const ROW_GAP: f32 = 8.0;
const HANDLE_WIDTH: f32 = 6.0;

const PANEL_BG: [f32; 4] = [0.07, 0.07, 0.09, 0.92];
const TRACK: [f32; 4] = [0.22, 0.22, 0.27, 1.0];
const FILL: [f32; 4] = [0.26, 0.59, 0.98, 1.0];
const HANDLE: [f32; 4] = [0.85, 0.85, 0.88, 1.0];
const BOX_ON: [f32; 4] = [0.26, 0.59, 0.98, 1.0];
const BOX_OFF: [f32; 4] = [0.22, 0.22, 0.27, 1.0];
const BUTTON: [f32; 4] = [0.45, 0.26, 0.26, 1.0];

/// The scalar parameters a slider can drive.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Binding {
    MouseSensitivity,
    MovementSpeed,
    FieldOfView,
    NearPlane,
    FarPlane,
    LightPosition(usize),
    LightDirection(usize),
    LightScale(usize),
    LightColor(usize),
    SpotAngle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Toggle {
    Ambient,
    Diffuse,
    Specular,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum WidgetKind {
    Slider {
        binding: Binding,
        min: f32,
        max: f32,
    },
    Toggle(Toggle),
    Kind(LightKind),
    ResetLight,
}

#[derive(Clone, Copy, Debug, Default)]
struct Rect {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

impl Rect {
    fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.w && y >= self.y && y <= self.y + self.h
    }
}

#[derive(Clone, Copy, Debug)]
struct Widget {
    kind: WidgetKind,
    rect: Rect,
}

/// The settings panel state: widget layout, cursor, and active drag.
#[derive(Debug)]
pub struct SettingsPanel {
    size: (u32, u32),
    cursor: (f32, f32),
    dragging: Option<usize>,
    widgets: Vec<Widget>,
}

impl SettingsPanel {
    pub fn new(width: u32, height: u32) -> Self {
        let mut panel = Self {
            size: (width.max(1), height.max(1)),
            cursor: (0.0, 0.0),
            dragging: None,
            widgets: Vec::new(),
        };
        panel.layout();
        panel
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = (width.max(1), height.max(1));
        self.layout();
    }

    fn panel_rect(&self) -> Rect {
        Rect {
            x: 0.0,
            y: 0.0,
            w: self.size.0 as f32 * PANEL_WIDTH_RATIO,
            h: self.size.1 as f32,
        }
    }

    fn layout(&mut self) {
        let panel = self.panel_rect();
        let inner_width = panel.w - 2.0 * MARGIN;
        let mut y = MARGIN;
        let mut widgets = Vec::new();

        let mut row = |kind: WidgetKind, x: f32, w: f32, y: &mut f32, advance: bool| {
            widgets.push(Widget {
                kind,
                rect: Rect {
                    x,
                    y: *y,
                    w,
                    h: ROW_HEIGHT,
                },
            });
            if advance {
                *y += ROW_HEIGHT + ROW_GAP;
            }
        };

        let sliders = [
            (Binding::MouseSensitivity, 0.0, 1.0),
            (Binding::MovementSpeed, 0.0, 100.0),
            (Binding::FieldOfView, 0.0, 180.0),
            (Binding::NearPlane, 0.0, 1000.0),
            (Binding::FarPlane, 0.0, 1000.0),
            (Binding::LightPosition(0), -100.0, 100.0),
            (Binding::LightPosition(1), -100.0, 100.0),
            (Binding::LightPosition(2), -100.0, 100.0),
            (Binding::LightDirection(0), -1.0, 1.0),
            (Binding::LightDirection(1), -1.0, 1.0),
            (Binding::LightDirection(2), -1.0, 1.0),
            (Binding::LightScale(0), 0.0, 10.0),
            (Binding::LightScale(1), 0.0, 10.0),
            (Binding::LightScale(2), 0.0, 10.0),
            (Binding::LightColor(0), 0.0, 1.0),
            (Binding::LightColor(1), 0.0, 1.0),
            (Binding::LightColor(2), 0.0, 1.0),
            (Binding::LightColor(3), 0.0, 1.0),
            (Binding::SpotAngle, 0.0, 90.0),
        ];
        for (binding, min, max) in sliders {
            row(
                WidgetKind::Slider { binding, min, max },
                MARGIN,
                inner_width,
                &mut y,
                true,
            );
        }

        for toggle in [Toggle::Ambient, Toggle::Diffuse, Toggle::Specular] {
            row(
                WidgetKind::Toggle(toggle),
                MARGIN,
                ROW_HEIGHT,
                &mut y,
                true,
            );
        }

        let kind_width = (inner_width - 2.0 * ROW_GAP) / 3.0;
        for (i, kind) in LightKind::ALL.into_iter().enumerate() {
            row(
                WidgetKind::Kind(kind),
                MARGIN + i as f32 * (kind_width + ROW_GAP),
                kind_width,
                &mut y,
                i == 2,
            );
        }

        row(WidgetKind::ResetLight, MARGIN, inner_width, &mut y, true);

        self.widgets = widgets;
    }

    /// True while the pointer is over the panel; the event loop keeps such
    /// input away from the camera.
    pub fn wants_pointer(&self) -> bool {
        let (x, y) = self.cursor;
        self.panel_rect().contains(x, y)
    }

    pub fn cursor_moved(&mut self, x: f32, y: f32, camera: &mut Camera, light: &mut LightSettings) {
        self.cursor = (x, y);
        if let Some(idx) = self.dragging {
            self.apply_slider(idx, camera, light);
        }
    }

    /// Handle a press of the designated mouse button. Returns true when the
    /// panel consumed the press.
    pub fn mouse_pressed(&mut self, camera: &mut Camera, light: &mut LightSettings) -> bool {
        if !self.wants_pointer() {
            return false;
        }
        let (x, y) = self.cursor;
        if let Some(idx) = self
            .widgets
            .iter()
            .position(|widget| widget.rect.contains(x, y))
        {
            match self.widgets[idx].kind {
                WidgetKind::Slider { .. } => {
                    self.dragging = Some(idx);
                    self.apply_slider(idx, camera, light);
                }
                WidgetKind::Toggle(toggle) => {
                    let flag = match toggle {
                        Toggle::Ambient => &mut light.enable_ambient,
                        Toggle::Diffuse => &mut light.enable_diffuse,
                        Toggle::Specular => &mut light.enable_specular,
                    };
                    *flag = !*flag;
                }
                WidgetKind::Kind(kind) => light.kind = kind,
                WidgetKind::ResetLight => light.reset(),
            }
        }
        true
    }

    pub fn mouse_released(&mut self) {
        self.dragging = None;
    }

    fn apply_slider(&mut self, idx: usize, camera: &mut Camera, light: &mut LightSettings) {
        let widget = self.widgets[idx];
        let WidgetKind::Slider { binding, min, max } = widget.kind else {
            return;
        };
        let t = ((self.cursor.0 - widget.rect.x) / widget.rect.w).clamp(0.0, 1.0);
        let value = min + t * (max - min);
        // Camera writes go through the clamping setters, so panel ranges may
        // be wider than the camera's legal ranges
        match binding {
            Binding::MouseSensitivity => camera.set_mouse_sensitivity(value),
            Binding::MovementSpeed => camera.set_movement_speed(value),
            Binding::FieldOfView => camera.set_field_of_view(value),
            Binding::NearPlane => {
                let (_, far) = camera.clip_planes();
                camera.set_clip_planes(value, far);
            }
            Binding::FarPlane => {
                let (near, _) = camera.clip_planes();
                camera.set_clip_planes(near, value);
            }
            Binding::LightPosition(axis) => light.position[axis] = value,
            Binding::LightDirection(axis) => light.direction[axis] = value,
            Binding::LightScale(axis) => light.scale[axis] = value,
            Binding::LightColor(channel) => light.color[channel] = value,
            Binding::SpotAngle => light.spot_angle = value,
        }
    }

    fn slider_value(binding: Binding, camera: &Camera, light: &LightSettings) -> f32 {
        match binding {
            Binding::MouseSensitivity => camera.mouse_sensitivity(),
            Binding::MovementSpeed => camera.movement_speed(),
            Binding::FieldOfView => camera.field_of_view(),
            Binding::NearPlane => camera.clip_planes().0,
            Binding::FarPlane => camera.clip_planes().1,
            Binding::LightPosition(axis) => light.position[axis],
            Binding::LightDirection(axis) => light.direction[axis],
            Binding::LightScale(axis) => light.scale[axis],
            Binding::LightColor(channel) => light.color[channel],
            Binding::SpotAngle => light.spot_angle,
        }
    }

    /// Emit the panel as colored quads in normalized device coordinates.
    pub fn build_quads(&self, camera: &Camera, light: &LightSettings) -> (Vec<GuiVertex>, Vec<u16>) {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        self.push_rect(&mut vertices, &mut indices, self.panel_rect(), PANEL_BG);

        for widget in &self.widgets {
            match widget.kind {
                WidgetKind::Slider { binding, min, max } => {
                    let value = Self::slider_value(binding, camera, light);
                    let t = ((value - min) / (max - min)).clamp(0.0, 1.0);
                    self.push_rect(&mut vertices, &mut indices, widget.rect, TRACK);
                    let fill = Rect {
                        w: widget.rect.w * t,
                        ..widget.rect
                    };
                    self.push_rect(&mut vertices, &mut indices, fill, FILL);
                    let handle = Rect {
                        x: (widget.rect.x + widget.rect.w * t - HANDLE_WIDTH / 2.0)
                            .clamp(widget.rect.x, widget.rect.x + widget.rect.w - HANDLE_WIDTH),
                        y: widget.rect.y - 2.0,
                        w: HANDLE_WIDTH,
                        h: widget.rect.h + 4.0,
                    };
                    self.push_rect(&mut vertices, &mut indices, handle, HANDLE);
                }
                WidgetKind::Toggle(toggle) => {
                    let on = match toggle {
                        Toggle::Ambient => light.enable_ambient,
                        Toggle::Diffuse => light.enable_diffuse,
                        Toggle::Specular => light.enable_specular,
                    };
                    self.push_rect(
                        &mut vertices,
                        &mut indices,
                        widget.rect,
                        if on { BOX_ON } else { BOX_OFF },
                    );
                }
                WidgetKind::Kind(kind) => {
                    let active = light.kind == kind;
                    self.push_rect(
                        &mut vertices,
                        &mut indices,
                        widget.rect,
                        if active { BOX_ON } else { BOX_OFF },
                    );
                }
                WidgetKind::ResetLight => {
                    self.push_rect(&mut vertices, &mut indices, widget.rect, BUTTON);
                }
            }
        }

        (vertices, indices)
    }

    fn push_rect(
        &self,
        vertices: &mut Vec<GuiVertex>,
        indices: &mut Vec<u16>,
        rect: Rect,
        color: [f32; 4],
    ) {
        let (w, h) = (self.size.0 as f32, self.size.1 as f32);
        let to_ndc = |x: f32, y: f32| [2.0 * x / w - 1.0, 1.0 - 2.0 * y / h];

        let base = vertices.len() as u16;
        for (x, y) in [
            (rect.x, rect.y),
            (rect.x, rect.y + rect.h),
            (rect.x + rect.w, rect.y + rect.h),
            (rect.x + rect.w, rect.y),
        ] {
            vertices.push(GuiVertex {
                position: to_ndc(x, y),
                color,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

/// Panel vertex/index capacity: generous for a few dozen widgets.
const PANEL_VERTEX_CAPACITY: u64 = 4096;
const PANEL_INDEX_CAPACITY: u64 = 8192;

/// GPU buffers the panel quads are streamed into each frame.
#[derive(Debug)]
pub struct PanelBuffers {
    pub vertex: wgpu::Buffer,
    pub index: wgpu::Buffer,
    pub index_count: u32,
}

impl PanelBuffers {
    pub fn new(device: &wgpu::Device) -> Self {
        let vertex = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Panel Vertex Buffer"),
            size: PANEL_VERTEX_CAPACITY * std::mem::size_of::<GuiVertex>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let index = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Panel Index Buffer"),
            size: PANEL_INDEX_CAPACITY * std::mem::size_of::<u16>() as u64,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            vertex,
            index,
            index_count: 0,
        }
    }

    /// Upload this frame's quads. Geometry beyond the fixed capacity is
    /// dropped with a warning rather than growing the buffers mid-frame.
    pub fn write(&mut self, queue: &wgpu::Queue, vertices: &[GuiVertex], indices: &[u16]) {
        if vertices.len() as u64 > PANEL_VERTEX_CAPACITY
            || indices.len() as u64 > PANEL_INDEX_CAPACITY
        {
            log::warn!(
                "panel geometry exceeds buffer capacity ({} vertices, {} indices), skipping",
                vertices.len(),
                indices.len()
            );
            self.index_count = 0;
            return;
        }
        queue.write_buffer(&self.vertex, 0, bytemuck::cast_slice(vertices));
        // Copy sizes must be 4-byte aligned; pad odd u16 index counts
        if indices.len() % 2 == 1 {
            let mut padded = indices.to_vec();
            padded.push(0);
            queue.write_buffer(&self.index, 0, bytemuck::cast_slice(&padded));
        } else {
            queue.write_buffer(&self.index, 0, bytemuck::cast_slice(indices));
        }
        self.index_count = indices.len() as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> SettingsPanel {
        SettingsPanel::new(1366, 768)
    }

    fn slider_index(panel: &SettingsPanel, binding: Binding) -> usize {
        panel
            .widgets
            .iter()
            .position(|w| matches!(w.kind, WidgetKind::Slider { binding: b, .. } if b == binding))
            .unwrap()
    }

    fn drag_to(
        panel: &mut SettingsPanel,
        idx: usize,
        t: f32,
        camera: &mut Camera,
        light: &mut LightSettings,
    ) {
        let rect = panel.widgets[idx].rect;
        let x = rect.x + rect.w * t;
        let y = rect.y + rect.h / 2.0;
        panel.cursor_moved(x, y, camera, light);
        assert!(panel.mouse_pressed(camera, light));
        panel.mouse_released();
    }

    #[test]
    fn pointer_capture_matches_panel_bounds() {
        let mut panel = panel();
        let mut camera = Camera::default();
        let mut light = LightSettings::default();
        panel.cursor_moved(10.0, 10.0, &mut camera, &mut light);
        assert!(panel.wants_pointer());
        panel.cursor_moved(1000.0, 10.0, &mut camera, &mut light);
        assert!(!panel.wants_pointer());
        assert!(!panel.mouse_pressed(&mut camera, &mut light));
    }

    #[test]
    fn fov_slider_writes_through_the_clamping_setter() {
        let mut panel = panel();
        let mut camera = Camera::default();
        let mut light = LightSettings::default();

        // The slider range starts at 0 but the camera floor is 1
        let idx = slider_index(&panel, Binding::FieldOfView);
        drag_to(&mut panel, idx, 0.0, &mut camera, &mut light);
        assert_eq!(camera.field_of_view(), 1.0);

        drag_to(&mut panel, idx, 1.0, &mut camera, &mut light);
        assert_eq!(camera.field_of_view(), 180.0);
    }

    #[test]
    fn clip_plane_sliders_cannot_invert_the_planes() {
        let mut panel = panel();
        let mut camera = Camera::default();
        let mut light = LightSettings::default();

        let near = slider_index(&panel, Binding::NearPlane);
        let far = slider_index(&panel, Binding::FarPlane);
        drag_to(&mut panel, near, 0.5, &mut camera, &mut light);
        drag_to(&mut panel, far, 0.1, &mut camera, &mut light);

        let (n, f) = camera.clip_planes();
        assert!(n > 0.0);
        assert!(f > n);
    }

    #[test]
    fn dragging_updates_while_the_button_is_held() {
        let mut panel = panel();
        let mut camera = Camera::default();
        let mut light = LightSettings::default();

        let idx = slider_index(&panel, Binding::MovementSpeed);
        let rect = panel.widgets[idx].rect;
        let y = rect.y + rect.h / 2.0;

        panel.cursor_moved(rect.x, y, &mut camera, &mut light);
        assert!(panel.mouse_pressed(&mut camera, &mut light));
        assert_eq!(camera.movement_speed(), 0.0);

        panel.cursor_moved(rect.x + rect.w, y, &mut camera, &mut light);
        assert_eq!(camera.movement_speed(), 100.0);

        panel.mouse_released();
        panel.cursor_moved(rect.x, y, &mut camera, &mut light);
        assert_eq!(camera.movement_speed(), 100.0);
    }

    #[test]
    fn toggles_kind_selector_and_reset_edit_the_light() {
        let mut panel = panel();
        let mut camera = Camera::default();
        let mut light = LightSettings::default();

        let toggle_idx = panel
            .widgets
            .iter()
            .position(|w| w.kind == WidgetKind::Toggle(Toggle::Diffuse))
            .unwrap();
        let rect = panel.widgets[toggle_idx].rect;
        panel.cursor_moved(rect.x + 1.0, rect.y + 1.0, &mut camera, &mut light);
        assert!(panel.mouse_pressed(&mut camera, &mut light));
        panel.mouse_released();
        assert!(!light.enable_diffuse);

        let spot_idx = panel
            .widgets
            .iter()
            .position(|w| w.kind == WidgetKind::Kind(LightKind::Spot))
            .unwrap();
        let rect = panel.widgets[spot_idx].rect;
        panel.cursor_moved(rect.x + 1.0, rect.y + 1.0, &mut camera, &mut light);
        assert!(panel.mouse_pressed(&mut camera, &mut light));
        panel.mouse_released();
        assert_eq!(light.kind, LightKind::Spot);

        let reset_idx = panel
            .widgets
            .iter()
            .position(|w| w.kind == WidgetKind::ResetLight)
            .unwrap();
        let rect = panel.widgets[reset_idx].rect;
        panel.cursor_moved(rect.x + 1.0, rect.y + 1.0, &mut camera, &mut light);
        assert!(panel.mouse_pressed(&mut camera, &mut light));
        assert_eq!(light, LightSettings::default());
    }

    #[test]
    fn quads_cover_every_widget_and_stay_in_ndc() {
        let panel = panel();
        let camera = Camera::default();
        let light = LightSettings::default();
        let (vertices, indices) = panel.build_quads(&camera, &light);

        assert!(!vertices.is_empty());
        assert_eq!(indices.len() % 3, 0);
        assert!(indices.iter().all(|i| (*i as usize) < vertices.len()));
        for v in &vertices {
            assert!(v.position[0] >= -1.0 && v.position[0] <= 1.0);
            assert!(v.position[1] >= -1.01 && v.position[1] <= 1.01);
        }
    }
}

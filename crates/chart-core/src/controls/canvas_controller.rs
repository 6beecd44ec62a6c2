use config_system::InteractionConfig;
use shared_types::events::{ElementState, MouseButton, PhysicalPosition, WindowEvent};

/// Pointer interaction state of one chart
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureState {
    Idle,
    Hovering,
    /// Drag-to-zoom selection in progress
    Dragging { start: PhysicalPosition },
    /// Pan of an already zoomed chart in progress
    Panning {
        start: PhysicalPosition,
        last: PhysicalPosition,
    },
}

/// What a pointer event meant, in pixel terms
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    None,
    Hover(PhysicalPosition),
    DragStarted(PhysicalPosition),
    DragMoved {
        start: PhysicalPosition,
        current: PhysicalPosition,
    },
    PanStarted(PhysicalPosition),
    /// Horizontal pixels moved since the previous pan event
    PanMoved { delta_x: f64 },
    ZoomSelected { start_x: f64, end_x: f64 },
    /// Release of a pan; `delta_x` is the segment since the last move
    PanCompleted { delta_x: f64 },
    /// Also produced by a pan released within the click threshold
    Click(PhysicalPosition),
    /// A press that ended as neither a click nor a zoom
    Cancelled,
    Left { pan_completed: bool },
}

pub struct CanvasController {
    position: PhysicalPosition,
    state: GestureState,
    thresholds: InteractionConfig,
}

impl Default for CanvasController {
    fn default() -> Self {
        Self::new(InteractionConfig::default())
    }
}

impl CanvasController {
    pub fn new(thresholds: InteractionConfig) -> Self {
        CanvasController {
            position: PhysicalPosition::new(-1., -1.),
            state: GestureState::Idle,
            thresholds,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn position(&self) -> PhysicalPosition {
        self.position
    }

    /// Whether a press is currently held on this chart
    pub fn is_dragging(&self) -> bool {
        matches!(
            self.state,
            GestureState::Dragging { .. } | GestureState::Panning { .. }
        )
    }

    /// Feed one pointer event; `zoomed` selects pan over drag-to-zoom on press
    pub fn handle_cursor_event(&mut self, event: WindowEvent, zoomed: bool) -> Gesture {
        match event {
            WindowEvent::CursorMoved { position } => self.handle_cursor_moved(position),
            WindowEvent::MouseInput {
                state,
                button,
                position,
            } => {
                self.position = position;
                self.handle_cursor_input(state, button, zoomed)
            }
            WindowEvent::CursorLeft => self.handle_cursor_left(),
        }
    }

    fn handle_cursor_moved(&mut self, position: PhysicalPosition) -> Gesture {
        self.position = position;
        match self.state {
            GestureState::Idle | GestureState::Hovering => {
                self.state = GestureState::Hovering;
                Gesture::Hover(position)
            }
            GestureState::Dragging { start } => Gesture::DragMoved {
                start,
                current: position,
            },
            GestureState::Panning { start, last } => {
                self.state = GestureState::Panning {
                    start,
                    last: position,
                };
                Gesture::PanMoved {
                    delta_x: position.x - last.x,
                }
            }
        }
    }

    fn handle_cursor_input(
        &mut self,
        state: ElementState,
        button: MouseButton,
        zoomed: bool,
    ) -> Gesture {
        if button != MouseButton::Left {
            return Gesture::None;
        }

        match state {
            ElementState::Pressed => {
                if self.is_dragging() {
                    return Gesture::None;
                }
                if zoomed {
                    self.state = GestureState::Panning {
                        start: self.position,
                        last: self.position,
                    };
                    Gesture::PanStarted(self.position)
                } else {
                    self.state = GestureState::Dragging {
                        start: self.position,
                    };
                    Gesture::DragStarted(self.position)
                }
            }
            ElementState::Released => {
                let end = self.position;
                let gesture = match self.state {
                    GestureState::Dragging { start } => self.classify_drag(start, end),
                    GestureState::Panning { start, last } => {
                        if start.delta(&end) < self.thresholds.click_threshold_px {
                            Gesture::Click(end)
                        } else {
                            Gesture::PanCompleted {
                                delta_x: end.x - last.x,
                            }
                        }
                    }
                    // Release without a press on this chart
                    GestureState::Idle | GestureState::Hovering => Gesture::None,
                };
                self.state = GestureState::Hovering;
                gesture
            }
        }
    }

    fn classify_drag(&self, start: PhysicalPosition, end: PhysicalPosition) -> Gesture {
        if start.delta(&end) < self.thresholds.click_threshold_px {
            Gesture::Click(end)
        } else if (end.x - start.x).abs() > self.thresholds.drag_threshold_px {
            Gesture::ZoomSelected {
                start_x: start.x.min(end.x),
                end_x: start.x.max(end.x),
            }
        } else {
            Gesture::Cancelled
        }
    }

    fn handle_cursor_left(&mut self) -> Gesture {
        let pan_completed = matches!(self.state, GestureState::Panning { start, .. }
            if start.delta(&self.position) >= self.thresholds.click_threshold_px);
        self.state = GestureState::Idle;
        Gesture::Left { pan_completed }
    }
}

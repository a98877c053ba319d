use super::fill::HoleFiller;
use super::lookup::HemisphereLayout;
use super::mask::MaskImage;
use super::polygon::rasterize_polygon;
use super::RoiError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Adds a polygon vertex in composite-image pixel coordinates.
    Vertex([f64; 2]),
    /// Closes the in-progress polygon.
    Complete,
    /// Discards the in-progress polygon.
    Abort,
    /// The display surface was closed.
    Close,
}

pub trait InputSource {
    /// `None` means the source is exhausted and is treated as [`InputEvent::Close`].
    fn next_event(&mut self) -> Option<InputEvent>;
}

impl<I> InputSource for I
where
    I: Iterator<Item = InputEvent>,
{
    fn next_event(&mut self) -> Option<InputEvent> {
        self.next()
    }
}

pub trait RoiDisplay {
    fn show(&mut self, composite: &MaskImage, vertex_mask: &[bool]);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingInput,
    PolygonComplete,
    Restarted,
    Closed,
}

/// Interactive ROI drawing over a hemisphere layout.
///
/// Completed polygons are unioned into the committed mask; nothing from an
/// in-progress polygon is committed until it completes.
pub struct DrawingSession<'a> {
    layout: &'a HemisphereLayout,
    filler: &'a dyn HoleFiller,
    state: SessionState,
    polygon: Vec<[f64; 2]>,
    mask: MaskImage,
    vertex_mask: Vec<bool>,
}

impl<'a> DrawingSession<'a> {
    pub fn new(layout: &'a HemisphereLayout, filler: &'a dyn HoleFiller) -> Self {
        Self {
            layout,
            filler,
            state: SessionState::AwaitingInput,
            polygon: Vec::new(),
            mask: layout.blank_image(),
            vertex_mask: vec![false; layout.num_vertices()],
        }
    }

    /// Starts from an existing vertex mask instead of an empty one.
    pub fn with_vertex_mask(mut self, vertex_mask: Vec<bool>) -> Result<Self, RoiError> {
        self.mask = self.layout.vertices_to_image(&vertex_mask)?;
        self.vertex_mask = vertex_mask;
        Ok(self)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn polygon(&self) -> &[[f64; 2]] {
        &self.polygon
    }

    pub fn vertex_mask(&self) -> &[bool] {
        &self.vertex_mask
    }

    pub fn composite(&self) -> Result<MaskImage, RoiError> {
        self.layout.vertices_to_image(&self.vertex_mask)
    }

    pub fn handle(&mut self, event: InputEvent) -> Result<SessionState, RoiError> {
        if self.state == SessionState::Closed {
            return Ok(self.state);
        }
        self.state = match event {
            InputEvent::Vertex(point) => {
                self.polygon.push(point);
                SessionState::AwaitingInput
            }
            InputEvent::Complete => {
                let polygon = std::mem::take(&mut self.polygon);
                if polygon.len() < 3 {
                    tracing::warn!(
                        "discarding polygon with {} vertices; at least 3 are needed",
                        polygon.len()
                    );
                    SessionState::Restarted
                } else {
                    self.commit(&polygon)?;
                    SessionState::PolygonComplete
                }
            }
            InputEvent::Abort => {
                self.polygon.clear();
                SessionState::Restarted
            }
            InputEvent::Close => {
                self.polygon.clear();
                SessionState::Closed
            }
        };
        Ok(self.state)
    }

    fn commit(&mut self, polygon: &[[f64; 2]]) -> Result<(), RoiError> {
        let drawn = rasterize_polygon(polygon, self.mask.width, self.mask.height);
        let mut merged = self.mask.clone();
        merged.union_with(&drawn);
        let vertex_mask = self.layout.image_to_vertices(&merged, self.filler)?;
        self.mask = self.filler.fill_holes(&merged);
        self.vertex_mask = vertex_mask;
        tracing::info!(
            "roi now covers {} vertices",
            self.vertex_mask.iter().filter(|v| **v).count()
        );
        Ok(())
    }

    /// Drives the session until the display is closed and returns the vertex mask.
    pub fn run<S, D>(mut self, source: &mut S, display: &mut D) -> Result<Vec<bool>, RoiError>
    where
        S: InputSource + ?Sized,
        D: RoiDisplay + ?Sized,
    {
        display.show(&self.composite()?, &self.vertex_mask);
        loop {
            let event = source.next_event().unwrap_or(InputEvent::Close);
            match self.handle(event)? {
                SessionState::PolygonComplete => {
                    display.show(&self.composite()?, &self.vertex_mask);
                }
                SessionState::Closed => break,
                SessionState::AwaitingInput | SessionState::Restarted => {}
            }
        }
        Ok(self.vertex_mask)
    }
}

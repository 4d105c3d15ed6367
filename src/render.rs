//! Render composition and pipeline batching.
//!
//! Scene nodes describe what they want drawn with a [`Render`] tree. The frame
//! loop flattens it into one batch per pipeline: opaque objects in submission
//! order and transparent objects sorted back to front from the camera.
//!
//! # Key types
//!
//! - [`Render<'a>`] is the enum describing render operations
//! - [`Instanced<'a>`] contains data for instanced rendering (mesh, material and instance buffer)

use cgmath::{MetricSpace, Point3};

/// Data for one instanced draw.
#[derive(Clone, Copy, Debug)]
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub mesh: &'a crate::data_structures::model::Mesh,
    pub material: &'a crate::data_structures::model::Material,
    pub amount: usize,
    pub casts_shadow: bool,
    /// World position used to order transparent draws.
    pub anchor: Point3<f32>,
}

/// Specifies how a scene object should be rendered.
///
/// - `None` renders nothing
/// - `Default(Instanced)` renders a single opaque instanced object
/// - `Defaults(Vec<Instanced>)` renders a batch of opaque instanced objects
/// - `Transparent(Instanced)` renders a single alpha-blended instanced object
/// - `Transparents(Vec<Instanced>)` renders a batch of alpha-blended objects
/// - `Composed(Vec<Render>)` recursively renders composition of multiple renders
pub enum Render<'a> {
    None,
    Default(Instanced<'a>),
    Defaults(Vec<Instanced<'a>>),
    Transparent(Instanced<'a>),
    Transparents(Vec<Instanced<'a>>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    pub(crate) fn set_pipelines(self, basics: &mut Vec<Instanced<'a>>, trans: &mut Vec<Instanced<'a>>) {
        match self {
            Render::Default(instanced) => basics.push(instanced),
            Render::Defaults(mut vec) => basics.append(&mut vec),
            Render::Transparent(instanced) => trans.push(instanced),
            Render::Transparents(mut vec) => trans.append(&mut vec),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(basics, trans)),
            Render::None => (),
        }
    }
}

/// Batches of draws for one frame.
#[derive(Default)]
pub struct Batches<'a> {
    pub opaque: Vec<Instanced<'a>>,
    pub transparent: Vec<Instanced<'a>>,
}

impl<'a> Batches<'a> {
    pub fn collect(renders: impl IntoIterator<Item = Render<'a>>, eye: Point3<f32>) -> Self {
        let mut batches = Batches::default();
        for render in renders {
            render.set_pipelines(&mut batches.opaque, &mut batches.transparent);
        }
        batches.transparent.sort_by(|a, b| {
            eye.distance2(b.anchor)
                .total_cmp(&eye.distance2(a.anchor))
        });
        batches
    }

    /// Everything that is drawn into the shadow maps.
    pub fn shadow_casters(&self) -> impl Iterator<Item = &Instanced<'a>> + Clone {
        self.opaque
            .iter()
            .chain(self.transparent.iter())
            .filter(|instanced| instanced.casts_shadow)
    }
}

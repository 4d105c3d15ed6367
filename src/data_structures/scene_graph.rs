//! Scene graph and hierarchical scene organization.
//!
//! Provides the [`SceneNode`] trait and its two implementations: a transform-only
//! [`ContainerNode`] (the house group) and a drawable [`ModelNode`] that pairs a
//! mesh with a material and owns the GPU instance buffer. Meshes and materials
//! live once in a [`ResourcePool`] and are shared through handles.

use std::ops::Range;

use log::warn;
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        instance::{Instance, InstanceRaw, ShadowFlags},
        model::{Material, Mesh},
    },
    render::{Instanced, Render},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub usize);

/// Owner of every uploaded mesh and material.
#[derive(Debug, Default)]
pub struct ResourcePool {
    meshes: Vec<Mesh>,
    materials: Vec<Material>,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshHandle {
        self.meshes.push(mesh);
        MeshHandle(self.meshes.len() - 1)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialHandle {
        self.materials.push(material);
        MaterialHandle(self.materials.len() - 1)
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.meshes.get(handle.0)
    }

    pub fn material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle.0)
    }
}

pub trait SceneNode {
    fn get_world_transforms(&self) -> Vec<Instance>;

    fn get_local_transform(&self, idx: usize) -> Option<Instance>;

    fn add_child(&mut self, child: Box<dyn SceneNode>);

    fn set_local_transform(&mut self, idx: usize, instance: Instance);

    fn set_local_transform_all(&mut self, mutation: &mut dyn FnMut(&mut Instance));

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device);

    /**
     * Multiple instances of a parent can be passed down to multiple instances of multiple children.
     * The argument `parents_world_transform` with a matching `range` size provides control over which instances are transformed.
     */
    fn update_world_transforms(&mut self, range: Range<usize>, parents_world_transform: &[Instance]);

    /// Recompute world transforms of this node and its subtree, treating this node as a root.
    fn update_world_transform_all(&mut self) {
        let amount = self.get_world_transforms().len();
        let roots = vec![Instance::default(); amount];
        self.update_world_transforms(0..amount, &roots);
    }

    fn get_render<'a>(&'a self, pool: &'a ResourcePool) -> Render<'a>;
}

/// Applies `parents` to the locals in `range`, stores and returns the new world transforms.
fn compose_world_transforms(
    instances: &mut [(Instance, Instance)],
    range: Range<usize>,
    parents: &[Instance],
) -> Option<Vec<Instance>> {
    if parents.len() > instances.len() {
        warn!(
            "You tried to transform with len {}, but there are only {} instances to transform.",
            parents.len(),
            instances.len()
        );
        return None;
    }
    let Some(slice) = instances.get_mut(range.clone()) else {
        warn!(
            "You tried to transform range {}..{}, which is out of bounds for parent len {}.",
            range.start,
            range.end,
            instances.len(),
        );
        return None;
    };
    Some(
        slice
            .iter_mut()
            .zip(parents)
            .map(|((local, world), parent)| {
                *world = parent * &*local;
                world.clone()
            })
            .collect(),
    )
}

/// A transform-only node that groups children, e.g. the house.
pub struct ContainerNode {
    pub children: Vec<Box<dyn SceneNode>>,
    pub instances: Vec<(Instance, Instance)>,
}

impl ContainerNode {
    pub fn new(amount: usize) -> Self {
        let instances = (0..amount)
            .map(|_| (Instance::default(), Instance::default()))
            .collect();
        Self {
            instances,
            children: vec![],
        }
    }

    pub fn with_transform(instance: Instance) -> Self {
        let mut node = Self::new(1);
        node.set_local_transform(0, instance);
        node
    }
}

impl SceneNode for ContainerNode {
    fn get_world_transforms(&self) -> Vec<Instance> {
        self.instances
            .iter()
            .map(|(_, world)| world)
            .cloned()
            .collect()
    }

    fn get_local_transform(&self, idx: usize) -> Option<Instance> {
        self.instances.get(idx).map(|(local, _)| local).cloned()
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn set_local_transform(&mut self, idx: usize, instance: Instance) {
        if let Some((local, _)) = self.instances.get_mut(idx) {
            *local = instance;
        }
    }

    fn set_local_transform_all(&mut self, mutation: &mut dyn FnMut(&mut Instance)) {
        self.instances
            .iter_mut()
            .for_each(|(local, _)| mutation(local));
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue, device));
    }

    fn update_world_transforms(&mut self, range: Range<usize>, parents_world_transform: &[Instance]) {
        let Some(world_transforms) =
            compose_world_transforms(&mut self.instances, range.clone(), parents_world_transform)
        else {
            return;
        };
        // children of a container inherit every container instance in lockstep
        for child in self.children.iter_mut() {
            let amount = child.get_world_transforms().len();
            if amount == world_transforms.len() {
                child.update_world_transforms(range.clone(), &world_transforms);
            } else if let Some(parent) = world_transforms.first() {
                child.update_world_transforms(0..amount, &vec![parent.clone(); amount]);
            }
        }
    }

    fn get_render<'a>(&'a self, pool: &'a ResourcePool) -> Render<'a> {
        Render::Composed(
            self.children
                .iter()
                .map(|child| child.get_render(pool))
                .collect(),
        )
    }
}

/// A drawable node: one mesh with one material, drawn once per instance.
pub struct ModelNode {
    pub name: String,
    children: Vec<Box<dyn SceneNode>>,
    instance_buffer: wgpu::Buffer,
    instances: Vec<(Instance, Instance)>,
    mesh: MeshHandle,
    material: MaterialHandle,
    shadow: ShadowFlags,
}

impl ModelNode {
    pub fn new(
        name: &str,
        device: &wgpu::Device,
        mesh: MeshHandle,
        material: MaterialHandle,
        shadow: ShadowFlags,
        instances: Vec<Instance>,
    ) -> Self {
        if instances.is_empty() {
            warn!("model node {name} created without instances, it will not be drawn");
        }
        let instances = instances
            .into_iter()
            .map(|instance| (instance.clone(), instance))
            .collect::<Vec<_>>();
        let instance_data = instances
            .iter()
            .map(|(_, world)| world.to_raw(shadow))
            .collect::<Vec<_>>();
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Instance Buffer")),
            contents: bytemuck::cast_slice(&instance_data),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            name: name.to_string(),
            children: vec![],
            instance_buffer,
            instances,
            mesh,
            material,
            shadow,
        }
    }
}

impl SceneNode for ModelNode {
    fn get_world_transforms(&self) -> Vec<Instance> {
        self.instances
            .iter()
            .map(|(_, world)| world)
            .cloned()
            .collect()
    }

    fn get_local_transform(&self, idx: usize) -> Option<Instance> {
        self.instances.get(idx).map(|(local, _)| local).cloned()
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn set_local_transform(&mut self, idx: usize, instance: Instance) {
        if let Some((local, _)) = self.instances.get_mut(idx) {
            *local = instance;
        }
    }

    fn set_local_transform_all(&mut self, mutation: &mut dyn FnMut(&mut Instance)) {
        self.instances
            .iter_mut()
            .for_each(|(local, _)| mutation(local));
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        let raw_instances: Vec<InstanceRaw> = self
            .instances
            .iter()
            .map(|(_, world)| world.to_raw(self.shadow))
            .collect();
        // the instance count is fixed at construction, so the buffer never grows
        if !raw_instances.is_empty() {
            queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&raw_instances),
            );
        }
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue, device));
    }

    fn update_world_transforms(&mut self, range: Range<usize>, parents_world_transform: &[Instance]) {
        let Some(world_transforms) =
            compose_world_transforms(&mut self.instances, range.clone(), parents_world_transform)
        else {
            return;
        };
        for child in self.children.iter_mut() {
            child.update_world_transforms(range.clone(), &world_transforms);
        }
    }

    fn get_render<'a>(&'a self, pool: &'a ResourcePool) -> Render<'a> {
        let children = self.children.iter().map(|child| child.get_render(pool));
        let (Some(mesh), Some(material)) = (pool.mesh(self.mesh), pool.material(self.material))
        else {
            warn!("model node {} refers to a missing mesh or material", self.name);
            return Render::Composed(children.collect());
        };
        if self.instances.is_empty() {
            return Render::Composed(children.collect());
        }
        let anchor = self.instances[0].1.position;
        let instanced = Instanced {
            instance: &self.instance_buffer,
            mesh,
            material,
            amount: self.instances.len(),
            casts_shadow: self.shadow.cast,
            anchor: cgmath::Point3::new(anchor.x, anchor.y, anchor.z),
        };
        let own = if material.transparent {
            Render::Transparent(instanced)
        } else {
            Render::Default(instanced)
        };
        Render::Composed(std::iter::once(own).chain(children).collect())
    }
}

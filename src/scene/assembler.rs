//! One-time construction of the diorama and its per-frame animation.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use cgmath::{EuclideanSpace, Point3, Transform};
use rand::{SeedableRng, rngs::StdRng};
use winit::event::WindowEvent;

use crate::{
    color::Rgb,
    config::SceneConfig,
    context::{Context, InitContext},
    data_structures::{
        geometry,
        instance::{Instance, ShadowFlags},
        scene_graph::{ContainerNode, ModelNode, ResourcePool, SceneNode},
    },
    flow::{GraphicsFlow, Out},
    pipelines::{
        light::{AmbientLight, DirectionalLight, Fog, LightSetup, PointLight},
        sky::SkyParams,
    },
    render::Render,
    resources::{self, mesh, texture},
    scene::{
        ghosts::{DOOR_LIGHT_BASE, FrameUpdate, GHOST_INTENSITY, GhostOrbit, LightSlots, ghost_orbits},
        graves::{GravePlacement, scatter_graves},
        materials,
        tuning::FloorTuning,
    },
};

pub const WALL_SIZE: [f32; 3] = [4.0, 2.5, 4.0];
pub const ROOF_RADIUS: f32 = 3.5;
pub const ROOF_HEIGHT: f32 = 1.5;
pub const DOOR_SIZE: f32 = 2.2;
pub const GRAVE_SIZE: [f32; 3] = [0.6, 0.8, 0.2];
/// Door light position relative to the house.
pub const DOOR_LIGHT_OFFSET: [f32; 3] = [0.0, 2.2, 2.5];
/// Bush position and uniform scale, all in house space.
pub const BUSHES: [([f32; 3], f32); 4] = [
    ([0.8, 0.2, 2.2], 0.5),
    ([1.4, 0.1, 2.1], 0.25),
    ([-0.8, 0.1, 2.2], 0.4),
    ([-1.0, 0.05, 2.6], 0.15),
];
pub const BUSH_TILT: f32 = -0.75;

pub fn floor_instance() -> Instance {
    Instance::new().with_euler_xyz(-FRAC_PI_2, 0.0, 0.0)
}

pub fn walls_instance() -> Instance {
    Instance::at(0.0, WALL_SIZE[1] / 2.0, 0.0)
}

pub fn roof_instance() -> Instance {
    Instance::at(0.0, WALL_SIZE[1] + ROOF_HEIGHT / 2.0, 0.0).with_euler_xyz(0.0, FRAC_PI_4, 0.0)
}

pub fn door_instance() -> Instance {
    Instance::at(0.0, 1.0, WALL_SIZE[2] / 2.0 + 0.01)
}

pub fn bush_instances() -> Vec<Instance> {
    BUSHES
        .iter()
        .map(|&([x, y, z], scale)| {
            Instance::at(x, y, z)
                .with_uniform_scale(scale)
                .with_euler_xyz(BUSH_TILT, 0.0, 0.0)
        })
        .collect()
}

/// Ambient, moonlight, fog, the door light and one point light per ghost.
///
/// `house` places the door light, which hangs off the house.
pub fn scene_lights(
    house: &Instance,
    orbits: &[GhostOrbit; 3],
) -> anyhow::Result<(LightSetup, LightSlots)> {
    let moon = Rgb::from_hex("#86cdff")?;
    let mut setup = LightSetup {
        ambient: AmbientLight {
            color: moon,
            intensity: 0.265,
        },
        sun: DirectionalLight {
            color: moon,
            intensity: 1.0,
            position: Point3::new(3.0, 2.0, -8.0),
            target: Point3::origin(),
            casts_shadow: true,
        },
        points: Vec::new(),
        fog: Fog {
            color: Rgb::from_hex("#02343f")?,
            density: 0.1,
        },
    };

    let door_position = house
        .to_matrix()
        .transform_point(Point3::from(DOOR_LIGHT_OFFSET));
    let door = setup.add_point(PointLight {
        color: Rgb::from_hex("#ff7d46")?,
        intensity: DOOR_LIGHT_BASE,
        position: door_position,
        casts_shadow: false,
    });

    let mut ghosts = [None; 3];
    for (slot, orbit) in ghosts.iter_mut().zip(orbits) {
        let [x, y, z] = orbit.position(0.0);
        *slot = setup.add_point(PointLight {
            color: orbit.rgb()?,
            intensity: GHOST_INTENSITY,
            position: Point3::new(x, y, z),
            casts_shadow: true,
        });
    }

    Ok((setup, LightSlots { ghosts, door }))
}

/// The haunted house diorama: static scene graph plus animated lights.
pub struct HauntedHouse {
    pool: ResourcePool,
    nodes: Vec<Box<dyn SceneNode>>,
    rng: StdRng,
    orbits: [GhostOrbit; 3],
    floor_tuning: FloorTuning,
    lights: LightSetup,
    slots: LightSlots,
    sky: SkyParams,
}

impl HauntedHouse {
    /// Loads every texture, builds the geometry and places the graves.
    pub async fn new(init: InitContext, config: SceneConfig) -> anyhow::Result<Self> {
        let InitContext {
            device,
            queue,
            material_layout,
        } = init;
        let root = config.asset_root.as_str();
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let descs = [
            materials::floor(),
            materials::walls(),
            materials::roof(),
            materials::door(),
            materials::bushes()?,
            materials::graves()?,
        ];
        let [floor, walls, roof, door, bushes, graves] = &descs;
        let (floor, walls, roof, door, bushes, graves, floor_height, door_height) = futures::try_join!(
            resources::load_material(floor, root, &device, &queue, &material_layout),
            resources::load_material(walls, root, &device, &queue, &material_layout),
            resources::load_material(roof, root, &device, &queue, &material_layout),
            resources::load_material(door, root, &device, &queue, &material_layout),
            resources::load_material(bushes, root, &device, &queue, &material_layout),
            resources::load_material(graves, root, &device, &queue, &material_layout),
            texture::load_image(root, materials::FLOOR_DISPLACEMENT),
            texture::load_image(root, materials::DOOR_HEIGHT),
        )?;
        log::info!("loaded {} materials from {root}", descs.len());

        let flat_floor = geometry::plane(20.0, 20.0, 100, 100);
        let mut floor_geometry = flat_floor.clone();
        mesh::displace(&mut floor_geometry, &floor_height, &config.floor_displacement);
        let mut door_geometry = geometry::plane(DOOR_SIZE, DOOR_SIZE, 100, 100);
        mesh::displace(&mut door_geometry, &door_height, &config.door_displacement);
        let [wx, wy, wz] = WALL_SIZE;
        let [gx, gy, gz] = GRAVE_SIZE;

        let mut pool = ResourcePool::new();
        let mut add = |name: &str, geometry: &geometry::Geometry, material| {
            (
                pool.add_mesh(mesh::upload_mesh(&device, name, geometry)),
                pool.add_material(material),
            )
        };
        let floor = add("floor", &floor_geometry, floor);
        let walls = add("walls", &geometry::cuboid(wx, wy, wz), walls);
        let roof = add("roof", &geometry::cone(ROOF_RADIUS, ROOF_HEIGHT, 4), roof);
        let door = add("door", &door_geometry, door);
        let bushes = add("bushes", &geometry::sphere(1.0, 16, 16), bushes);
        let graves_handles = add("graves", &geometry::cuboid(gx, gy, gz), graves);

        let floor_tuning = FloorTuning::new(
            flat_floor,
            floor_height,
            config.floor_displacement.clone(),
            floor.0,
        );

        let floor = ModelNode::new(
            "floor",
            &device,
            floor.0,
            floor.1,
            ShadowFlags::RECEIVE,
            vec![floor_instance()],
        );

        let house_transform = Instance::new();
        let mut house = ContainerNode::with_transform(house_transform.clone());
        house.add_child(Box::new(ModelNode::new(
            "walls",
            &device,
            walls.0,
            walls.1,
            ShadowFlags::BOTH,
            vec![walls_instance()],
        )));
        house.add_child(Box::new(ModelNode::new(
            "roof",
            &device,
            roof.0,
            roof.1,
            ShadowFlags::CAST,
            vec![roof_instance()],
        )));
        house.add_child(Box::new(ModelNode::new(
            "door",
            &device,
            door.0,
            door.1,
            ShadowFlags::NONE,
            vec![door_instance()],
        )));
        house.add_child(Box::new(ModelNode::new(
            "bushes",
            &device,
            bushes.0,
            bushes.1,
            ShadowFlags::NONE,
            bush_instances(),
        )));

        let placements = scatter_graves(&mut rng, config.grave_count);
        log::info!("placed {} graves", placements.len());
        let graves = ModelNode::new(
            "graves",
            &device,
            graves_handles.0,
            graves_handles.1,
            ShadowFlags::BOTH,
            placements.iter().map(GravePlacement::to_instance).collect(),
        );

        let orbits = ghost_orbits();
        let (lights, slots) = scene_lights(&house_transform, &orbits)?;

        Ok(Self {
            pool,
            nodes: vec![Box::new(floor), Box::new(house), Box::new(graves)],
            rng,
            orbits,
            floor_tuning,
            lights,
            slots,
            sky: SkyParams::default(),
        })
    }
}

impl GraphicsFlow for HauntedHouse {
    fn on_init(&mut self, ctx: &mut Context) -> Out {
        ctx.lights.setup = self.lights.clone();
        ctx.sky.set_params(&ctx.queue, self.sky);
        ctx.clear_colour = self.lights.fog.color.to_wgpu();
        for node in self.nodes.iter_mut() {
            node.update_world_transform_all();
            node.write_to_buffers(&ctx.queue, &ctx.device);
        }
        log::info!("{} point lights", self.lights.points.len());
        Out::Empty
    }

    fn on_update(&mut self, _ctx: &Context, elapsed: instant::Duration) -> Out {
        let frame = FrameUpdate::compute(&self.orbits, elapsed.as_secs_f32(), &mut self.rng);
        let slots = self.slots;
        Out::Configure(Box::new(move |ctx: &mut Context| {
            frame.apply(&mut ctx.lights.setup, &slots)
        }))
    }

    fn on_window_events(&mut self, ctx: &Context, event: &WindowEvent) -> Out {
        self.floor_tuning.on_event(event, &self.pool, &ctx.queue);
        Out::Empty
    }

    fn on_render<'a>(&'a self) -> Render<'a> {
        Render::Composed(
            self.nodes
                .iter()
                .map(|node| node.get_render(&self.pool))
                .collect(),
        )
    }
}

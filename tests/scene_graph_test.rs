use std::f32::consts::FRAC_PI_2;

use haunted_house::data_structures::{
    instance::Instance,
    scene_graph::{ContainerNode, SceneNode},
};

use crate::common::test_utils::{EPS, assert_close3};

mod common;

fn position(instance: &Instance) -> [f32; 3] {
    instance.position.into()
}

#[test]
fn children_inherit_the_parent_transform() {
    let mut house = ContainerNode::with_transform(Instance::at(1.0, 0.0, -2.0));
    let mut door = ContainerNode::new(1);
    door.set_local_transform(0, Instance::at(0.0, 1.0, 2.01));
    house.add_child(Box::new(door));

    house.update_world_transform_all();

    assert_close3(position(&house.get_world_transforms()[0]), [1.0, 0.0, -2.0], EPS);
    let door = &house.children[0];
    assert_close3(position(&door.get_world_transforms()[0]), [1.0, 1.0, 0.01], EPS);
    // locals are untouched
    assert_close3(position(&door.get_local_transform(0).unwrap()), [0.0, 1.0, 2.01], EPS);
}

#[test]
fn parent_rotation_and_scale_apply_to_child_offsets() {
    let parent = Instance::new()
        .with_euler_xyz(0.0, FRAC_PI_2, 0.0)
        .with_uniform_scale(2.0);
    let mut root = ContainerNode::with_transform(parent);
    let mut child = ContainerNode::new(1);
    child.set_local_transform(0, Instance::at(1.0, 0.0, 0.0));
    root.add_child(Box::new(child));

    root.update_world_transform_all();

    let world = &root.children[0].get_world_transforms()[0];
    assert_close3(position(world), [0.0, 0.0, -2.0], EPS);
    assert_close3(world.scale.into(), [2.0, 2.0, 2.0], EPS);
}

#[test]
fn multi_instance_children_share_a_single_parent() {
    let mut root = ContainerNode::with_transform(Instance::at(0.0, 5.0, 0.0));
    let mut bushes = ContainerNode::new(3);
    for i in 0..3 {
        bushes.set_local_transform(i, Instance::at(i as f32, 0.0, 0.0));
    }
    root.add_child(Box::new(bushes));

    root.update_world_transform_all();

    let worlds = root.children[0].get_world_transforms();
    assert_eq!(worlds.len(), 3);
    for (i, world) in worlds.iter().enumerate() {
        assert_close3(position(world), [i as f32, 5.0, 0.0], EPS);
    }
}

#[test]
fn mutations_are_picked_up_on_the_next_update() {
    let mut root = ContainerNode::new(2);
    root.add_child(Box::new(ContainerNode::new(2)));
    root.update_world_transform_all();

    root.set_local_transform_all(&mut |local| local.position.y += 1.5);
    root.update_world_transform_all();

    for world in root.children[0].get_world_transforms() {
        assert_close3(position(&world), [0.0, 1.5, 0.0], EPS);
    }
}

#[test]
fn out_of_range_access_is_ignored() {
    let mut node = ContainerNode::new(1);
    node.set_local_transform(4, Instance::at(9.0, 9.0, 9.0));
    assert!(node.get_local_transform(4).is_none());
    assert_eq!(node.get_local_transform(0), Some(Instance::new()));

    // more parents than instances leaves the node as it was
    let before = node.get_world_transforms();
    node.update_world_transforms(0..2, &[Instance::at(1.0, 0.0, 0.0), Instance::new()]);
    assert_eq!(node.get_world_transforms(), before);
}

//! Integration tests for st-layout.

use st_blocks::{BlockKind, LoopKind, NodeKind, NodeMut, PropertyValue, ServoLoop};
use st_layout::{BlockLayout, LayoutTree};

#[test]
fn name_lookup_accepts_common_spellings() {
    let layout = BlockLayout::default();
    for name in [
        "Servo Controller",
        "Servo_Controller",
        "servo_controller",
        "  SERVO controller ",
    ] {
        assert_eq!(
            layout.find_by_name(name).unwrap().kind(),
            NodeKind::Block(BlockKind::ServoController),
            "{name}"
        );
    }
    assert_eq!(
        layout.find_by_name("Current Controller").unwrap().kind(),
        NodeKind::Block(BlockKind::DigitalCurrentLoop)
    );
    assert_eq!(
        layout.find_by_name("current_plant").unwrap().kind(),
        NodeKind::Loop(LoopKind::CurrentPlant)
    );
}

#[test]
fn edits_through_name_lookup_reach_the_tree() {
    let mut layout = BlockLayout::default();
    match layout.find_by_name_mut("Motor Plant").unwrap() {
        NodeMut::Block(b) => b.set_property("L (mH)", PropertyValue::Float(2.5)).unwrap(),
        NodeMut::Loop(_) => panic!("motor plant is a block"),
    }
    assert_eq!(layout.motor_plant().properties.inductance_mh, 2.5);
}

#[test]
fn flatten_is_preorder() {
    let layout = BlockLayout::default();
    let kinds: Vec<_> = layout.flatten_blocks().iter().map(|b| b.kind()).collect();
    assert_eq!(
        kinds,
        [
            BlockKind::ServoController,
            BlockKind::DigitalCurrentLoop,
            BlockKind::AmplifierPlant,
            BlockKind::AmplifierRolloffFilter,
            BlockKind::MotorPlant,
            BlockKind::CurrentFeedbackLowPassFilter,
            BlockKind::MechanicalPlant,
        ]
    );
}

#[test]
fn display_tree_is_indented() {
    let layout = BlockLayout::default();
    let text = layout.tree().to_string();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines[0], "Servo Loop");
    assert_eq!(lines[1], "  Servo Controller");
    assert_eq!(lines[2], "  Servo Plant");
    assert!(lines.contains(&"        Motor Plant"));
    assert_eq!(lines.len(), 11);
}

#[test]
fn tree_serializes_with_names() {
    let layout = BlockLayout::default();
    let json = serde_json::to_value(layout.tree()).unwrap();
    assert_eq!(json["name"], "Servo Loop");
    assert_eq!(json["children"][1]["children"][1]["name"], "Mechanical Plant");
    let back: LayoutTree = serde_json::from_value(json).unwrap();
    assert_eq!(&back, layout.tree());
}

#[test]
fn layout_round_trips_through_yaml() {
    let mut layout = BlockLayout::default();
    layout.mechanical_plant_mut().properties.damping_n_s_per_m = 4.0;
    let text = serde_yaml::to_string(&layout).unwrap();
    let back: BlockLayout = serde_yaml::from_str(&text).unwrap();
    assert_eq!(back, layout);
    assert_eq!(
        back.find_block(BlockKind::MechanicalPlant)
            .property("Damping")
            .unwrap(),
        PropertyValue::Float(4.0)
    );

    let root: ServoLoop = serde_yaml::from_str(&text).unwrap();
    assert_eq!(BlockLayout::new(root), layout);
}

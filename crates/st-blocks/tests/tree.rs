//! Whole-tree behaviour: configuration loading and generic property editing.

use st_blocks::{
    BlockKind, BlockRepresentation, ControlBlock, ControlLoop, DriveType, EvalContext, NodeMut,
    NodeRef, PropertyValue, ServoLoop,
};
use st_core::TWO_PI;
use st_core::grid::logspace;
use st_filters::FilterType;

const PARTIAL: &str = r#"
servo_controller:
  drive_type: Galvo
  kpv: 2.5
  servo_filters:
    - type: LowPass
      parameters: [500.0]
servo_plant:
  representation: FrequencyResponse
  mechanical_plant:
    mass_kg: 2.0
  current_loop:
    digital_current_loop:
      ki: 300.0
"#;

fn collect_blocks<'a>(node: NodeRef<'a>, out: &mut Vec<BlockKind>) {
    match node {
        NodeRef::Loop(l) => {
            for child in l.children() {
                collect_blocks(child, out);
            }
        }
        NodeRef::Block(b) => out.push(b.kind()),
    }
}

fn set_everywhere(node: NodeMut<'_>, name: &str, value: &PropertyValue) -> usize {
    match node {
        NodeMut::Loop(l) => l
            .children_mut()
            .into_iter()
            .map(|child| set_everywhere(child, name, value))
            .sum(),
        NodeMut::Block(b) => usize::from(b.set_property(name, value.clone()).is_ok()),
    }
}

#[test]
fn partial_yaml_fills_defaults() {
    let servo: ServoLoop = serde_yaml::from_str(PARTIAL).unwrap();
    let c = &servo.servo_controller.properties;
    assert_eq!(c.drive_type, DriveType::Galvo);
    assert_eq!(c.kpv, 2.5);
    assert_eq!(c.kiv, 1.0);
    assert_eq!(c.servo_filters[0].filter_type(), FilterType::LowPass);
    assert_eq!(c.servo_filters[0].parameters(), &[500.0]);

    assert!(servo.servo_plant.is_frequency_response());
    assert_eq!(servo.servo_plant.mechanical_plant.properties.mass_kg, 2.0);
    assert_eq!(
        servo.servo_plant.mechanical_plant.properties.representation,
        BlockRepresentation::Parameters
    );
    assert_eq!(
        servo
            .servo_plant
            .current_loop
            .digital_current_loop
            .properties
            .ki,
        300.0
    );
}

#[test]
fn yaml_round_trip_preserves_tree() {
    let servo: ServoLoop = serde_yaml::from_str(PARTIAL).unwrap();
    let text = serde_yaml::to_string(&servo).unwrap();
    let back: ServoLoop = serde_yaml::from_str(&text).unwrap();
    assert_eq!(back, servo);
}

#[test]
fn traversal_reaches_every_block_once() {
    let servo = ServoLoop::default();
    let mut kinds = Vec::new();
    collect_blocks(NodeRef::Loop(&servo), &mut kinds);
    let mut sorted = kinds.clone();
    sorted.sort();
    assert_eq!(sorted, BlockKind::ALL.to_vec());
    assert_eq!(kinds.first(), Some(&BlockKind::ServoController));
    assert_eq!(kinds.last(), Some(&BlockKind::MechanicalPlant));
}

#[test]
fn generic_property_editing() {
    let mut servo = ServoLoop::default();
    // Amplifier Plant and Digital Current Loop and Servo Controller all have K.
    let hits = set_everywhere(NodeMut::Loop(&mut servo), "K", &PropertyValue::Float(3.0));
    assert_eq!(hits, 3);
    assert_eq!(servo.servo_controller.properties.k, 3.0);
    assert_eq!(
        servo
            .servo_plant
            .current_loop
            .current_plant
            .amplifier_plant
            .properties
            .k,
        3.0
    );

    let props = servo.servo_plant.mechanical_plant.properties();
    assert!(props.iter().any(|(d, _)| d.label() == "Damping (N*s/m)"));
}

#[test]
fn every_block_evaluates_finitely_with_defaults() {
    let omega = logspace(TWO_PI * 10.0, TWO_PI * 10_000.0, 200).unwrap();
    let ctx = EvalContext::new(&omega, 20_000.0);
    let mut servo = ServoLoop::default();
    let responses = [
        servo.servo_controller.evaluate(&ctx),
        servo.servo_plant.mechanical_plant.evaluate(&ctx),
        servo.servo_plant.current_loop.digital_current_loop.evaluate(&ctx),
        servo.servo_plant.current_loop.current_plant.evaluate(&ctx),
    ];
    for frd in &responses {
        assert_eq!(frd.len(), omega.len());
        assert!(frd.response().iter().all(|v| v.is_finite()));
    }
    assert!(servo.servo_controller.last_response().is_some());
    assert!(servo.servo_plant.representation().is_some());
}

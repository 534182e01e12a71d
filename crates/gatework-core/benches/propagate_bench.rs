//! Benchmarks for change propagation and group construction.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gatework_core::{Circuit, Gate, GroupBuilder, Limits, UnitId};

/// A switch feeding a chain of inverters. Returns the circuit and switch.
fn build_chain(depth: usize) -> (Circuit, UnitId) {
    let mut circuit = Circuit::with_limits(Limits::permissive());
    let switch = circuit.add_switch(1);
    let mut previous = circuit.unit(switch).unwrap().output(0).unwrap();
    for _ in 0..depth {
        let not = circuit.add_gate(Gate::Not);
        let input = circuit.unit(not).unwrap().input(0).unwrap();
        circuit.connect(previous, input).unwrap();
        previous = circuit.unit(not).unwrap().output(0).unwrap();
    }
    (circuit, switch)
}

/// A switch fanned out to `width` identity gates.
fn build_fan_out(width: usize) -> (Circuit, UnitId) {
    let mut circuit = Circuit::new();
    let switch = circuit.add_switch(1);
    let out = circuit.unit(switch).unwrap().output(0).unwrap();
    for _ in 0..width {
        let gate = circuit.add_gate(Gate::Identity);
        let input = circuit.unit(gate).unwrap().input(0).unwrap();
        circuit.connect(out, input).unwrap();
    }
    (circuit, switch)
}

/// Half adder members and boundary, ready to be grouped.
fn half_adder_builder(circuit: &mut Circuit) -> GroupBuilder {
    let buf_a = circuit.add_gate(Gate::Identity);
    let buf_b = circuit.add_gate(Gate::Identity);
    let or = circuit.add_gate(Gate::Or);
    let carry = circuit.add_gate(Gate::And);
    let not = circuit.add_gate(Gate::Not);
    let sum = circuit.add_gate(Gate::And);

    let wires = [
        (buf_a, or, 0),
        (buf_a, carry, 0),
        (buf_b, or, 1),
        (buf_b, carry, 1),
        (carry, not, 0),
        (or, sum, 0),
        (not, sum, 1),
    ];
    for (from, to, index) in wires {
        let out = circuit.unit(from).unwrap().output(0).unwrap();
        let input = circuit.unit(to).unwrap().input(index).unwrap();
        circuit.connect(out, input).unwrap();
    }

    let mut builder = GroupBuilder::new("Half adder", "HA");
    for member in [buf_a, buf_b, or, carry, not, sum] {
        builder.add_member(member).unwrap();
    }
    builder.expose(circuit.unit(buf_a).unwrap().input(0).unwrap());
    builder.expose(circuit.unit(buf_b).unwrap().input(0).unwrap());
    builder.expose(circuit.unit(sum).unwrap().output(0).unwrap());
    builder.expose(circuit.unit(carry).unwrap().output(0).unwrap());
    builder
}

fn bench_toggle_chain(c: &mut Criterion) {
    for depth in [10, 50, 100] {
        let (mut circuit, switch) = build_chain(depth);
        c.bench_function(&format!("toggle_chain_depth_{depth}"), |b| {
            b.iter(|| circuit.toggle(black_box(switch)).unwrap())
        });
    }
}

fn bench_toggle_fan_out(c: &mut Criterion) {
    let (mut circuit, switch) = build_fan_out(100);
    c.bench_function("toggle_fan_out_100", |b| {
        b.iter(|| circuit.toggle(black_box(switch)).unwrap())
    });
}

fn bench_build_group(c: &mut Criterion) {
    c.bench_function("build_half_adder_group", |b| {
        b.iter(|| {
            let mut circuit = Circuit::new();
            let builder = half_adder_builder(&mut circuit);
            builder.build(&mut circuit).unwrap()
        })
    });
}

fn bench_copy_group(c: &mut Criterion) {
    let mut circuit = Circuit::new();
    let builder = half_adder_builder(&mut circuit);
    let group = builder.encapsulate(&mut circuit).unwrap();

    c.bench_function("copy_half_adder_group", |b| {
        b.iter(|| {
            let copy = circuit.copy_unit(black_box(group)).unwrap();
            circuit.remove_unit(copy).unwrap();
        })
    });
}

criterion_group!(
    benches,
    bench_toggle_chain,
    bench_toggle_fan_out,
    bench_build_group,
    bench_copy_group,
);

criterion_main!(benches);

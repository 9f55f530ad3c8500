// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of molsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::f64::consts::PI;

use tracing::{trace, warn};

use super::{LayoutEngine, LinkForce, Point};
use crate::model::{SharedObject, Value};

const INITIAL_RADIUS: f64 = 10.0;
const DISTANCE_MIN_SQUARED: f64 = 1.0;
/// Nudge used instead of a random jiggle when two nodes coincide.
const JIGGLE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    pub charge_strength: f64,
    pub alpha_min: f64,
    pub alpha_decay: f64,
    pub alpha_target: f64,
    pub velocity_decay: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        let alpha_min = 0.001;
        Self {
            charge_strength: -30.0,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            alpha_target: 0.0,
            velocity_decay: 0.4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Body {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    fx: Option<f64>,
    fy: Option<f64>,
}

/// Velocity-Verlet style force simulation: link springs, all-pairs charge and centering.
///
/// Charge is computed by brute force, which is plenty for molecule-sized graphs.
#[derive(Debug, Clone)]
pub struct ForceSimulation {
    params: SimulationParams,
    alpha: f64,
    center: Point,
    nodes: Vec<SharedObject>,
    bodies: Vec<Body>,
    links: Vec<LinkForce>,
    bias: Vec<f64>,
}

impl Default for ForceSimulation {
    fn default() -> Self {
        Self::new(SimulationParams::default())
    }
}

impl ForceSimulation {
    pub fn new(params: SimulationParams) -> Self {
        Self {
            params,
            alpha: 0.0,
            center: Point::default(),
            nodes: Vec::new(),
            bodies: Vec::new(),
            links: Vec::new(),
            bias: Vec::new(),
        }
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn links(&self) -> &[LinkForce] {
        &self.links
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn apply_links(&mut self, alpha: f64) {
        for (link, bias) in self.links.iter().zip(&self.bias) {
            let (source, target) = (self.bodies[link.source], self.bodies[link.target]);
            let mut dx = target.x + target.vx - source.x - source.vx;
            let mut dy = target.y + target.vy - source.y - source.vy;
            if dx == 0.0 {
                dx = JIGGLE;
            }
            if dy == 0.0 {
                dy = JIGGLE;
            }
            let length = (dx * dx + dy * dy).sqrt();
            let scale = (length - link.distance) / length * alpha * link.strength;
            dx *= scale;
            dy *= scale;

            let target = &mut self.bodies[link.target];
            target.vx -= dx * bias;
            target.vy -= dy * bias;
            let source = &mut self.bodies[link.source];
            source.vx += dx * (1.0 - bias);
            source.vy += dy * (1.0 - bias);
        }
    }

    fn apply_charge(&mut self, alpha: f64) {
        let strength = self.params.charge_strength;
        let count = self.bodies.len();
        for i in 0..count {
            let (mut ax, mut ay) = (0.0, 0.0);
            let node = self.bodies[i];
            for (j, other) in self.bodies.iter().enumerate() {
                if i == j {
                    continue;
                }
                let mut dx = other.x - node.x;
                let dy = other.y - node.y;
                if dx == 0.0 && dy == 0.0 {
                    dx = JIGGLE;
                }
                let mut distance_squared = dx * dx + dy * dy;
                if distance_squared < DISTANCE_MIN_SQUARED {
                    distance_squared = (DISTANCE_MIN_SQUARED * distance_squared).sqrt();
                }
                ax += dx * strength * alpha / distance_squared;
                ay += dy * strength * alpha / distance_squared;
            }
            self.bodies[i].vx += ax;
            self.bodies[i].vy += ay;
        }
    }

    fn apply_center(&mut self) {
        if self.bodies.is_empty() {
            return;
        }
        let count = self.bodies.len() as f64;
        let (sum_x, sum_y) =
            self.bodies.iter().fold((0.0, 0.0), |(sx, sy), body| (sx + body.x, sy + body.y));
        let shift_x = sum_x / count - self.center.x;
        let shift_y = sum_y / count - self.center.y;
        for body in &mut self.bodies {
            body.x -= shift_x;
            body.y -= shift_y;
        }
    }

    fn integrate(&mut self) {
        let keep = 1.0 - self.params.velocity_decay;
        for body in &mut self.bodies {
            match body.fx {
                Some(fx) => {
                    body.x = fx;
                    body.vx = 0.0;
                }
                None => {
                    body.vx *= keep;
                    body.x += body.vx;
                }
            }
            match body.fy {
                Some(fy) => {
                    body.y = fy;
                    body.vy = 0.0;
                }
                None => {
                    body.vy *= keep;
                    body.y += body.vy;
                }
            }
        }
    }

    fn write_back(&self) {
        for (node, body) in self.nodes.iter().zip(&self.bodies) {
            let mut node = node.borrow_mut();
            node.insert("x", Value::from_f64(body.x));
            node.insert("y", Value::from_f64(body.y));
            node.insert("vx", Value::from_f64(body.vx));
            node.insert("vy", Value::from_f64(body.vy));
        }
    }
}

impl LayoutEngine for ForceSimulation {
    fn bind(&mut self, nodes: &[SharedObject], links: Vec<LinkForce>, center: Point) {
        let angle_step = PI * (3.0 - 5f64.sqrt());
        self.bodies = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| {
                let mut record = node.borrow_mut();
                record.insert("index", Value::Number((index as u64).into()));

                let finite = |key: &str| record.get_f64(key).filter(|value| value.is_finite());
                let radius = INITIAL_RADIUS * (0.5 + index as f64).sqrt();
                let angle = index as f64 * angle_step;
                Body {
                    x: finite("x").unwrap_or(radius * angle.cos()),
                    y: finite("y").unwrap_or(radius * angle.sin()),
                    vx: finite("vx").unwrap_or(0.0),
                    vy: finite("vy").unwrap_or(0.0),
                    fx: finite("fx"),
                    fy: finite("fy"),
                }
            })
            .collect();
        self.nodes = nodes.to_vec();

        let (links, dangling): (Vec<_>, Vec<_>) = links
            .into_iter()
            .partition(|link| link.source < nodes.len() && link.target < nodes.len());
        if !dangling.is_empty() {
            warn!(dropped = dangling.len(), nodes = nodes.len(), "skipping links to missing nodes");
        }

        let mut degree = vec![0usize; nodes.len()];
        for link in &links {
            degree[link.source] += 1;
            degree[link.target] += 1;
        }
        self.bias = links
            .iter()
            .map(|link| {
                let source = degree[link.source] as f64;
                source / (source + degree[link.target] as f64)
            })
            .collect();
        self.links = links;
        self.center = center;
        self.alpha = 1.0;
        self.write_back();

        trace!(nodes = self.nodes.len(), links = self.links.len(), "simulation bound");
    }

    fn tick(&mut self) -> bool {
        if self.is_settled() {
            return false;
        }

        self.alpha += (self.params.alpha_target - self.alpha) * self.params.alpha_decay;
        let alpha = self.alpha;
        self.apply_links(alpha);
        self.apply_charge(alpha);
        self.apply_center();
        self.integrate();
        self.write_back();
        true
    }

    fn is_settled(&self) -> bool {
        self.alpha < self.params.alpha_min
    }
}

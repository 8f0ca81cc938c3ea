//! Bioluminescent branch network.
//!
//! Built breadth-first from a work queue into an index arena: node 0 is the
//! center, every other node has exactly one incoming connection from a node
//! one level shallower.

use std::collections::VecDeque;
use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::SceneBounds;

pub const ROOT_BRANCHES: usize = 5;
pub const MAX_LEVELS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkNode {
    pub position: Vec2,
    pub depth: u32,
    pub brightness: f32,
    pub size: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub parent: usize,
    pub child: usize,
    /// Depth of the parent node; gates when the segment starts to grow.
    pub depth: u32,
    /// Drawn fraction of the segment, in [0, 1].
    pub progress: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    pub nodes: Vec<NetworkNode>,
    pub connections: Vec<Connection>,
    pub max_depth: u32,
    pub max_radius: f32,
}

struct Branch {
    parent: usize,
    angle: f32,
    length: f32,
    level: u32,
}

pub fn build<R: Rng + ?Sized>(bounds: &SceneBounds, rng: &mut R) -> Network {
    let max_radius = bounds.min_dim() * 0.45;
    let mut nodes = vec![NetworkNode {
        position: Vec2::ZERO,
        depth: 0,
        brightness: 0.0,
        size: 4.0,
    }];
    let mut connections = Vec::new();
    let mut queue = VecDeque::new();

    for i in 0..ROOT_BRANCHES {
        queue.push_back(Branch {
            parent: 0,
            angle: i as f32 / ROOT_BRANCHES as f32 * TAU + rng.gen_range(-0.15..0.15),
            length: max_radius * 0.3,
            level: 1,
        });
    }

    while let Some(branch) = queue.pop_front() {
        let from = nodes[branch.parent].position;
        let to = from + Vec2::from_angle(branch.angle) * branch.length;
        if to.length() > max_radius {
            continue;
        }
        let id = nodes.len();
        nodes.push(NetworkNode {
            position: to,
            depth: branch.level,
            brightness: 0.0,
            size: rng.gen_range(1.5..3.0),
        });
        connections.push(Connection {
            parent: branch.parent,
            child: id,
            depth: branch.level - 1,
            progress: 0.0,
        });

        if branch.level < MAX_LEVELS {
            let splits: u32 = rng.gen_range(3..=4);
            let spread = 0.9;
            for k in 0..splits {
                let fan = k as f32 / (splits - 1) as f32 - 0.5;
                queue.push_back(Branch {
                    parent: id,
                    angle: branch.angle + fan * spread + rng.gen_range(-0.12..0.12),
                    length: branch.length * rng.gen_range(0.65..0.85),
                    level: branch.level + 1,
                });
            }
        }
    }

    let max_depth = nodes.iter().map(|n| n.depth).max().unwrap_or(0).max(1);
    Network {
        nodes,
        connections,
        max_depth,
        max_radius,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn network(seed: u64) -> Network {
        build(
            &SceneBounds::new(Vec2::new(900.0, 700.0)),
            &mut StdRng::seed_from_u64(seed),
        )
    }

    #[test]
    fn every_node_is_within_max_radius() {
        for seed in 0..8 {
            let net = network(seed);
            for node in &net.nodes {
                assert!(node.position.length() <= net.max_radius + 1e-3);
            }
        }
    }

    #[test]
    fn network_is_a_tree_rooted_at_center() {
        let net = network(3);
        assert_eq!(net.connections.len(), net.nodes.len() - 1);
        let mut parents = vec![0usize; net.nodes.len()];
        for conn in &net.connections {
            parents[conn.child] += 1;
            assert!(conn.parent < conn.child, "edges only point outward");
            assert_eq!(net.nodes[conn.parent].depth + 1, net.nodes[conn.child].depth);
            assert_eq!(conn.depth, net.nodes[conn.parent].depth);
        }
        assert_eq!(parents[0], 0);
        assert!(parents[1..].iter().all(|&p| p == 1));
    }

    #[test]
    fn depth_is_bounded() {
        let net = network(9);
        assert!(net.max_depth <= MAX_LEVELS);
        assert!(net.nodes.len() > ROOT_BRANCHES);
    }
}

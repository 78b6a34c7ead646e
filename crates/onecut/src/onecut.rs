use ibfs::{
    Capacity, DinicGraph, GraphState, INFINITE_CAPACITY, IbfsGraph, MaxFlow, SolverStats,
};
use image::RgbImage;

use crate::bins::ColorBins;
use crate::error::{Error, Result};
use crate::mask::BoxMask;
use crate::nlinks::{NeighborLink, compute_links};
use crate::params::{Backend, OneCutParams};
use crate::segmentation::{Label, Segmentation};

/// Terms that depend on the bounding box.
#[derive(Debug, Clone)]
struct BoxTerms {
    inside: Vec<bool>,
    /// Capacity of every pixel-to-bin arc.
    separation: Capacity,
}

enum Solver {
    Ibfs(IbfsGraph),
    Dinic(DinicGraph),
}

/// "GrabCut in One Cut" energy over one image.
///
/// Graph layout: pixel `x + y * width` is node `x + y * width`; color bin `b` is the auxiliary
/// node `width * height + b`. Source = object, sink = background.
pub struct OneCut {
    image: RgbImage,
    params: OneCutParams,
    links: Vec<NeighborLink>,
    bins: ColorBins,
    terms: Option<BoxTerms>,
    solver: Option<Solver>,
}

impl OneCut {
    /// Precomputes the box-independent parts: n-link contrast weights and color bins.
    pub fn new(image: &RgbImage, params: OneCutParams) -> Result<Self> {
        let bins = ColorBins::new(image, params.color_bin_size)?;
        let links = compute_links(image, params.connectivity);
        tracing::info!(
            width = image.width(),
            height = image.height(),
            color_bin_size = params.color_bin_size,
            color_bins = bins.len(),
            neighbor_links = links.len(),
            "onecut energy prepared"
        );
        Ok(Self {
            image: image.clone(),
            params,
            links,
            bins,
            terms: None,
            solver: None,
        })
    }

    pub fn params(&self) -> &OneCutParams {
        &self.params
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn pixel_count(&self) -> usize {
        self.image.width() as usize * self.image.height() as usize
    }

    /// Pixels plus one auxiliary node per non-empty color bin.
    pub fn node_count(&self) -> usize {
        self.pixel_count() + self.bins.len()
    }

    pub fn links(&self) -> &[NeighborLink] {
        &self.links
    }

    pub fn bins(&self) -> &ColorBins {
        &self.bins
    }

    /// Counters of the IBFS backend, when it is the one in use.
    pub fn solver_stats(&self) -> Option<&SolverStats> {
        match &self.solver {
            Some(Solver::Ibfs(g)) => Some(g.stats()),
            _ => None,
        }
    }

    fn box_terms(&self, mask: &BoxMask) -> Result<BoxTerms> {
        if mask.dimensions() != self.dimensions() {
            return Err(Error::ImageSize {
                what: "box mask",
                expected: self.dimensions(),
                found: mask.dimensions(),
            });
        }
        let box_size = mask.size();
        if box_size == 0 {
            return Err(Error::EmptyBox);
        }
        let overlap = self.bins.histogram_overlap(|p| mask.contains(p));
        // Identical histograms cannot be separated; drop the term.
        let separation = if overlap == 0 {
            0
        } else {
            let weight = self.params.color_separation_beta * box_size as f64 / overlap as f64;
            (weight * self.params.scale) as Capacity
        };
        Ok(BoxTerms {
            inside: (0..self.pixel_count()).map(|p| mask.contains(p)).collect(),
            separation,
        })
    }

    fn inside_weight(&self) -> Capacity {
        self.params.scale as Capacity
    }

    /// Builds a fresh graph for `mask`: hard background outside the box, linear foreground
    /// ballooning inside it, Potts smoothness and L1 color separation.
    pub fn construct(&mut self, mask: &BoxMask) -> Result<()> {
        let terms = self.box_terms(mask)?;
        let solver = match self.params.backend {
            Backend::Ibfs => {
                let mut g = IbfsGraph::new(self.params.solver.clone());
                self.fill(&mut g, &terms)?;
                g.init_graph()?;
                Solver::Ibfs(g)
            }
            Backend::Dinic => {
                let mut g = DinicGraph::new();
                self.fill(&mut g, &terms)?;
                Solver::Dinic(g)
            }
        };
        tracing::debug!(
            backend = ?self.params.backend,
            nodes = self.node_count(),
            box_size = mask.size(),
            separation = terms.separation,
            "onecut graph constructed"
        );
        self.terms = Some(terms);
        self.solver = Some(solver);
        Ok(())
    }

    fn fill<G: MaxFlow>(&self, g: &mut G, terms: &BoxTerms) -> Result<()> {
        let pixels = self.pixel_count();
        g.init_size(self.node_count(), self.links.len() + pixels)?;
        let inside_weight = self.inside_weight();
        for (p, &inside) in terms.inside.iter().enumerate() {
            if inside {
                g.add_node(p, inside_weight, 0)?;
            } else {
                g.add_node(p, 0, INFINITE_CAPACITY)?;
            }
        }
        for link in &self.links {
            let cap = (self.params.potts_weight * link.weight * self.params.scale) as Capacity;
            g.add_edge(link.p, link.q, cap, cap)?;
        }
        // Kept even at zero capacity so a later box can raise them in place.
        for p in 0..pixels {
            g.add_edge(p, pixels + self.bins.bin(p), terms.separation, terms.separation)?;
        }
        Ok(())
    }

    /// Moves the bounding box. With the IBFS backend the change is applied as capacity deltas
    /// and the next [`Self::run`] reuses the previous search trees; other backends rebuild.
    pub fn update_box(&mut self, mask: &BoxMask) -> Result<()> {
        let terms = self.box_terms(mask)?;
        let inside_weight = self.inside_weight();
        let (Some(Solver::Ibfs(g)), Some(old)) = (self.solver.as_mut(), self.terms.as_ref())
        else {
            return self.construct(mask);
        };

        let mut flipped = 0usize;
        for (p, (&was, &now)) in old.inside.iter().zip(&terms.inside).enumerate() {
            match (was, now) {
                (true, false) => g.inc_node(p, -inside_weight, INFINITE_CAPACITY)?,
                (false, true) => g.inc_node(p, inside_weight, -INFINITE_CAPACITY)?,
                _ => continue,
            }
            flipped += 1;
        }
        let delta = terms.separation - old.separation;
        if delta != 0 {
            let pixels = terms.inside.len();
            for p in 0..pixels {
                g.inc_edge(p, pixels + self.bins.bin(p), delta, delta)?;
            }
        }
        tracing::debug!(flipped, separation_delta = delta, "bounding box updated");
        self.terms = Some(terms);
        Ok(())
    }

    /// Cuts the constructed graph. Pixels no terminal can reach are labeled object.
    pub fn run(&mut self) -> Result<Segmentation> {
        let (width, height) = self.dimensions();
        let pixels = self.pixel_count();
        let solver = self.solver.as_mut().ok_or(Error::NotConstructed)?;
        let flow = match solver {
            Solver::Ibfs(g) => {
                if g.state() == GraphState::Sized {
                    g.init_graph()?;
                }
                // Before the first solve this takes the cold path.
                g.compute_max_flow_incremental()?
            }
            Solver::Dinic(g) => g.compute_max_flow()?,
        };

        let labels = (0..pixels)
            .map(|p| {
                let on_source = match &*solver {
                    Solver::Ibfs(g) => g.is_node_on_src_side(p, true),
                    Solver::Dinic(g) => g.is_node_on_src_side(p, true),
                };
                if on_source {
                    Label::Object
                } else {
                    Label::Background
                }
            })
            .collect();
        let segmentation = Segmentation::new(width, height, labels, flow);
        if segmentation.is_degenerate() {
            tracing::warn!(
                object_pixels = segmentation.object_pixels(),
                "segmentation puts every pixel on one side"
            );
        }
        tracing::info!(
            flow,
            object_pixels = segmentation.object_pixels(),
            "onecut segmentation computed"
        );
        Ok(segmentation)
    }
}

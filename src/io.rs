use anyhow::Result;
use std::fs::File;
use std::io::{BufWriter, Write};

use crate::genetic::GaSolution;
use crate::pareto::ScoredCombination;

pub struct CsvWriter {
    w: BufWriter<File>,
}

impl CsvWriter {
    pub fn create(path: &str) -> Result<Self> {
        let f = File::create(path)?;
        Ok(Self { w: BufWriter::new(f) })
    }

    pub fn write_header(&mut self) -> Result<()> {
        writeln!(
            self.w,
            "rank,combination_id,parcels,total_area_sqm,avg_far,combined_far,total_cost_eok,avg_price_per_sqm,area_score,far_score,cost_score,shape_score,synergy_score,total_score,pareto_optimal,dominated_by"
        )?;
        Ok(())
    }

    pub fn write_row(&mut self, c: &ScoredCombination) -> Result<()> {
        writeln!(
            self.w,
            "{},{},{},{:.1},{:.2},{:.2},{:.4},{:.0},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{},{}",
            c.rank,
            c.combination.id,
            c.combination.parcel_count(),
            c.combination.total_area,
            c.combination.avg_far,
            c.combination.combined_far,
            c.combination.total_cost,
            c.combination.average_price_per_sqm,
            c.score.area_score,
            c.score.far_score,
            c.score.cost_score,
            c.score.shape_score,
            c.score.synergy_score,
            c.score.total_score,
            c.is_pareto_optimal,
            c.dominated_by.join("|"),
        )?;
        Ok(())
    }

    pub fn write_ga_header(&mut self) -> Result<()> {
        writeln!(
            self.w,
            "rank,parcels,parcel_ids,total_area_sqm,estimated_far,estimated_cost_eok,fitness"
        )?;
        Ok(())
    }

    pub fn write_ga_row(&mut self, rank: usize, sol: &GaSolution) -> Result<()> {
        writeln!(
            self.w,
            "{},{},{},{:.1},{:.2},{:.4},{:.2}",
            rank,
            sol.parcel_ids.len(),
            sol.parcel_ids.join("|"),
            sol.total_area,
            sol.estimated_far,
            sol.estimated_cost,
            sol.fitness,
        )?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.w.flush()?;
        Ok(())
    }
}

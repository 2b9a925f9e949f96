//! k-anonymity grouping
//!
//! Records are partitioned on their quasi-identifier buckets. A partition
//! smaller than k borrows the closest unassigned records from the rest of the
//! batch and is generalized so that every member shares one age and one zip.
//!
//! Backfill compares every candidate with every member, so a batch costs
//! O(n²) comparisons in the worst case.

use super::diversity::DiversityScorer;
use super::generalize::{
    age_range, dissimilarity, generalized_age, generalized_zip, salary_range, short_hash,
    zip_prefix,
};
use crate::domain::{AnonymizedRecord, PersonalRecord};
use std::collections::HashMap;

/// Width a backfilled group's common zip prefix is padded to
pub const GENERALIZED_ZIP_WIDTH: usize = 5;

/// Quasi-identifier key of a record: age bucket, zip prefix, gender
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuasiKey {
    pub age_range: &'static str,
    pub zip_prefix: String,
    pub gender: String,
}

impl QuasiKey {
    /// Key of a record
    pub fn of(record: &PersonalRecord) -> Self {
        Self {
            age_range: age_range(i64::from(record.age)),
            zip_prefix: zip_prefix(&record.zip_code),
            gender: record.gender.clone(),
        }
    }
}

/// One finalized group: indices into the input batch, plus the generalized
/// age and zip when the group was backfilled
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub members: Vec<usize>,
    pub generalized: Option<(u32, String)>,
}

/// Partitions a batch into k-anonymous groups
#[derive(Debug, Clone)]
pub struct KAnonymizer {
    target_l: usize,
    scorer: DiversityScorer,
}

impl KAnonymizer {
    /// Create a grouper warning on groups scoring below `target_l`
    pub fn new(target_l: usize, scorer: DiversityScorer) -> Self {
        Self {
            target_l,
            scorer,
        }
    }

    /// Partition by quasi-identifier key, in first-seen order
    pub fn partition(records: &[PersonalRecord]) -> Vec<(QuasiKey, Vec<usize>)> {
        let mut index: HashMap<QuasiKey, usize> = HashMap::new();
        let mut partitions: Vec<(QuasiKey, Vec<usize>)> = Vec::new();

        for (i, record) in records.iter().enumerate() {
            let key = QuasiKey::of(record);
            match index.get(&key) {
                Some(&slot) => partitions[slot].1.push(i),
                None => {
                    index.insert(key.clone(), partitions.len());
                    partitions.push((key, vec![i]));
                }
            }
        }

        partitions
    }

    /// Build the final groups for `k`
    ///
    /// Every input index appears in exactly one returned group. A group is
    /// smaller than `k` only when the batch ran out of unassigned records.
    pub fn groups(&self, records: &[PersonalRecord], k: usize) -> Vec<Group> {
        let mut assigned = vec![false; records.len()];
        let mut groups = Vec::new();

        for (key, partition) in Self::partition(records) {
            // Members borrowed by an earlier group are gone
            let mut members: Vec<usize> =
                partition.into_iter().filter(|&i| !assigned[i]).collect();
            if members.is_empty() {
                continue;
            }

            if members.len() >= k {
                for &i in &members {
                    assigned[i] = true;
                }
                groups.push(Group {
                    members,
                    generalized: None,
                });
                continue;
            }

            let needed = k - members.len();
            let borrowed = self.closest_candidates(records, &members, &assigned, needed);
            if borrowed.len() < needed {
                tracing::warn!(
                    age_range = key.age_range,
                    size = members.len() + borrowed.len(),
                    k,
                    "Not enough records left to reach k; releasing smaller group"
                );
            }
            members.extend(borrowed);
            for &i in &members {
                assigned[i] = true;
            }

            let ages: Vec<u32> = members.iter().map(|&i| records[i].age).collect();
            let zips: Vec<&str> = members
                .iter()
                .map(|&i| records[i].zip_code.as_str())
                .collect();
            let generalized =
                (generalized_age(&ages), generalized_zip(&zips, GENERALIZED_ZIP_WIDTH));

            groups.push(Group {
                members,
                generalized: Some(generalized),
            });
        }

        groups
    }

    /// Anonymize a batch so that each released record shares its
    /// quasi-identifiers with at least `k - 1` others where possible
    ///
    /// Records are emitted group by group. With `k <= 1` or an empty batch,
    /// every record is its own group with k = 1 and l = 1.
    pub fn anonymize(&self, records: &[PersonalRecord], k: usize) -> Vec<AnonymizedRecord> {
        if records.is_empty() || k <= 1 {
            return records.iter().map(|r| release(r, None, 1, 1)).collect();
        }

        let mut out = Vec::with_capacity(records.len());
        for group in self.groups(records, k) {
            let l = self.scorer.score(group.members.iter().map(|&i| &records[i]));
            if l < self.target_l {
                tracing::warn!(
                    size = group.members.len(),
                    l,
                    target_l = self.target_l,
                    "Group is below the target diversity"
                );
            }
            let size = group.members.len();
            for &i in &group.members {
                out.push(release(&records[i], group.generalized.as_ref(), size, l));
            }
        }
        out
    }

    /// Unassigned records outside the group, closest first, at most `needed`
    fn closest_candidates(
        &self,
        records: &[PersonalRecord],
        members: &[usize],
        assigned: &[bool],
        needed: usize,
    ) -> Vec<usize> {
        let mut ranked: Vec<(usize, f64)> = records
            .iter()
            .enumerate()
            .filter(|(i, _)| !assigned[*i] && !members.contains(i))
            .map(|(i, candidate)| {
                let distance = members
                    .iter()
                    .map(|&m| dissimilarity(&records[m], candidate))
                    .fold(f64::INFINITY, f64::min);
                (i, distance)
            })
            .collect();

        // Stable: ties keep input order
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranked.into_iter().take(needed).map(|(i, _)| i).collect()
    }
}

impl Default for KAnonymizer {
    fn default() -> Self {
        Self::new(2, DiversityScorer::default())
    }
}

fn release(
    record: &PersonalRecord,
    generalized: Option<&(u32, String)>,
    k: usize,
    l: usize,
) -> AnonymizedRecord {
    let (age, zip) = match generalized {
        Some((age, zip)) => (*age, zip.as_str()),
        None => (record.age, record.zip_code.as_str()),
    };

    AnonymizedRecord {
        id_hash: short_hash(record.id.as_str()),
        age_range: age_range(i64::from(age)).to_string(),
        zip_prefix: zip_prefix(zip),
        gender: record.gender.clone(),
        salary_range: salary_range(record.salary).to_string(),
        condition: record.condition.clone(),
        anonymity_level: k,
        diversity_level: l,
    }
}

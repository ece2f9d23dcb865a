//! Property-based tests for manifest merging, writing and reconciliation.
//!
//! These tests use proptest to generate random member sets and verify that
//! invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use std::collections::BTreeSet;
    use std::path::{Path, PathBuf};

    use crate::manifest::{
        merge_parsed, parse_manifest, write_manifest, Manifest, MemberIndex, MergeOptions,
    };
    use crate::reconcile::{reconcile, Status};
    use proptest::prelude::*;

    fn member_set() -> impl Strategy<Value = BTreeSet<String>> {
        prop::collection::btree_set("[A-Za-z][A-Za-z0-9_]{0,8}", 0..8)
    }

    fn manifest(path: &str, type_name: &str, members: &BTreeSet<String>) -> Manifest {
        Manifest {
            path: PathBuf::from(path),
            types: vec![(type_name.to_string(), members.iter().cloned().collect())],
            version: None,
        }
    }

    // ============================================================================
    // merge property tests
    // ============================================================================

    proptest! {
        /// Property: the merged member set is the union of the inputs
        #[test]
        fn merge_is_union(a in member_set(), b in member_set()) {
            let report = merge_parsed(
                vec![manifest("a.xml", "ApexClass", &a), manifest("b.xml", "ApexClass", &b)],
                &MergeOptions::default(),
            ).unwrap();
            let union: BTreeSet<String> = a.union(&b).cloned().collect();
            let merged = report.index.get("ApexClass").cloned().unwrap_or_default();
            prop_assert_eq!(merged, union);
        }

        /// Property: a duplicate is reported exactly for the shared members
        #[test]
        fn duplicates_are_the_intersection(a in member_set(), b in member_set()) {
            let report = merge_parsed(
                vec![manifest("a.xml", "ApexClass", &a), manifest("b.xml", "ApexClass", &b)],
                &MergeOptions::default(),
            ).unwrap();
            let common: BTreeSet<String> = a.intersection(&b).cloned().collect();
            let reported: BTreeSet<String> = report
                .duplicates
                .iter()
                .flat_map(|item| item.members.iter().cloned())
                .collect();
            prop_assert_eq!(reported, common);
        }

        /// Property: strict merging fails iff the inputs share a member
        #[test]
        fn strict_merge_fails_on_overlap(a in member_set(), b in member_set()) {
            let options = MergeOptions {
                fail_on_duplicate: true,
                ..MergeOptions::default()
            };
            let result = merge_parsed(
                vec![manifest("a.xml", "ApexClass", &a), manifest("b.xml", "ApexClass", &b)],
                &options,
            );
            prop_assert_eq!(result.is_err(), !a.is_disjoint(&b));
        }
    }

    // ============================================================================
    // write_manifest property tests
    // ============================================================================

    proptest! {
        /// Property: a written manifest parses back to the same index
        #[test]
        fn written_manifest_parses_back(classes in member_set(), flows in member_set()) {
            let mut index = MemberIndex::new();
            index.insert("ApexClass".to_string(), classes);
            index.insert("Flow".to_string(), flows);
            index.retain(|_, members| !members.is_empty());

            let text = write_manifest(&index, None);
            let parsed = parse_manifest(&text, Path::new("package.xml")).unwrap();
            prop_assert_eq!(parsed.to_index(), index);
        }
    }

    // ============================================================================
    // reconcile property tests
    // ============================================================================

    proptest! {
        /// Property: the three partitions cover both sides exactly
        #[test]
        fn reconcile_partitions_members(declared in member_set(), found in member_set()) {
            let mut manifest_index = MemberIndex::new();
            manifest_index.insert("ApexClass".to_string(), declared.clone());
            let mut project_index = MemberIndex::new();
            project_index.insert("ApexClass".to_string(), found.clone());

            let report = reconcile(&manifest_index, &project_index);
            let row = &report.rows[0];
            let project_only = row.in_project_only.clone().unwrap();
            let manifest_only = row.in_manifest_only.clone().unwrap();

            prop_assert_eq!(row.identical + project_only.len(), found.len());
            prop_assert_eq!(row.identical + manifest_only.len(), declared.len());
            prop_assert_eq!(report.success, manifest_only.is_empty());
            if !manifest_only.is_empty() {
                prop_assert_eq!(row.status, Status::Error);
            }
        }

        /// Property: a wildcard manifest always reconciles successfully
        #[test]
        fn wildcard_always_succeeds(found in member_set()) {
            let mut manifest_index = MemberIndex::new();
            manifest_index.insert("ApexClass".to_string(), BTreeSet::from(["*".to_string()]));
            let mut project_index = MemberIndex::new();
            project_index.insert("ApexClass".to_string(), found.clone());

            let report = reconcile(&manifest_index, &project_index);
            prop_assert!(report.success);
            prop_assert_eq!(report.rows[0].status, Status::Success);
            prop_assert_eq!(report.rows[0].identical, found.len());
        }
    }
}

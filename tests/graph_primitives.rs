// tests/graph_primitives.rs

mod common;
use crate::common::{diamond_dag, names};

use workdag::dag::Dag;
use workdag::errors::WorkdagError;
use workdag::result::{DagResult, TIMEOUT_ERROR_KEY};
use workdag_test_utils::dag_from;

#[test]
fn reverse_produces_successor_edges_for_every_job() {
    let rev = diamond_dag().reverse();

    assert_eq!(rev.len(), 5);
    assert_eq!(rev.dependencies_of("A"), names(&["B", "C"]).as_slice());
    assert_eq!(rev.dependencies_of("B"), names(&["D"]).as_slice());
    assert_eq!(rev.dependencies_of("C"), names(&["D"]).as_slice());
    assert_eq!(rev.dependencies_of("D"), names(&["E"]).as_slice());
    assert!(rev.dependencies_of("E").is_empty());
    assert!(rev.contains("E"));
}

#[test]
fn subtree_over_reverse_graph_is_downstream_set() {
    let rev = diamond_dag().reverse();

    assert_eq!(rev.subtree("A"), names(&["A", "B", "C", "D", "E"]));
    assert_eq!(rev.subtree("B"), names(&["B", "D", "E"]));
    assert_eq!(rev.subtree("E"), names(&["E"]));
}

#[test]
fn subtree_over_dependency_graph_is_dependency_closure() {
    let dag = diamond_dag();
    assert_eq!(dag.subtree("D"), names(&["A", "B", "C", "D"]));
    assert_eq!(dag.subtree("A"), names(&["A"]));
}

#[test]
fn roots_are_jobs_without_dependencies() {
    let dag = dag_from(&[("x", &[]), ("y", &[]), ("z", &["x", "y"])]);
    assert_eq!(dag.roots(), names(&["x", "y"]));
}

#[test]
fn insert_collapses_duplicate_dependencies() {
    let dag = Dag::new()
        .with_job("A", Vec::<String>::new())
        .with_job("B", ["A", "A"]);
    assert_eq!(dag.dependencies_of("B"), names(&["A"]).as_slice());
}

#[test]
fn valid_dag_passes_validation() {
    diamond_dag().validate().expect("diamond DAG should be valid");
}

#[test]
fn unknown_dependency_is_rejected() {
    let dag = dag_from(&[("A", &[]), ("B", &["ghost"])]);

    match dag.validate() {
        Err(WorkdagError::UnknownDependency { job, dependency }) => {
            assert_eq!(job, "B");
            assert_eq!(dependency, "ghost");
        }
        other => panic!("expected UnknownDependency, got {other:?}"),
    }
}

#[test]
fn cycle_is_rejected_with_its_path() {
    let dag = dag_from(&[("a", &["b"]), ("b", &["c"]), ("c", &["a"])]);

    let cycle = dag.find_cycle().expect("cycle should be found");
    assert_eq!(cycle.first(), cycle.last());
    assert_eq!(cycle.len(), 4);

    match dag.validate() {
        Err(WorkdagError::DagCycle(msg)) => assert!(msg.contains("a -> b -> c -> a"), "{msg}"),
        other => panic!("expected DagCycle, got {other:?}"),
    }
}

#[test]
fn self_loop_is_a_cycle() {
    let dag = dag_from(&[("a", &["a"])]);
    assert!(matches!(dag.validate(), Err(WorkdagError::DagCycle(_))));
}

#[test]
fn reserved_name_is_rejected() {
    let dag = dag_from(&[(TIMEOUT_ERROR_KEY, &[])]);
    assert!(matches!(
        dag.validate(),
        Err(WorkdagError::ReservedJobName(name)) if name == TIMEOUT_ERROR_KEY
    ));
}

#[test]
fn topological_order_puts_dependencies_first() {
    let dag = diamond_dag();
    let order = dag.topological_order().expect("acyclic");
    let pos = |job: &str| order.iter().position(|j| j == job).expect("job in order");

    assert_eq!(order.len(), 5);
    for job in dag.jobs() {
        for dep in dag.dependencies_of(job) {
            assert!(pos(dep) < pos(job), "{dep} must come before {job}");
        }
    }
}

#[test]
fn restrict_keeps_only_dependency_closure() {
    let dag = diamond_dag();

    let sub = dag.restrict_to_dependencies_of("B").expect("B exists");
    assert_eq!(sub.jobs().collect::<Vec<_>>(), vec!["A", "B"]);
    assert!(dag.restrict_to_dependencies_of("nope").is_none());
}

#[test]
fn long_chains_do_not_exhaust_the_stack() {
    const LEN: usize = 50_000;
    let name = |i: usize| format!("job_{i:05}");

    let mut dag = Dag::new();
    dag.insert(name(0), Vec::<String>::new());
    for i in 1..LEN {
        dag.insert(name(i), [name(i - 1)]);
    }

    // Run on a deliberately small stack so any per-node recursion overflows.
    let handle = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(move || {
            dag.validate().expect("chain is acyclic");
            assert!(dag.find_cycle().is_none());
            assert_eq!(dag.subtree(&name(LEN - 1)).len(), LEN);
            assert_eq!(dag.reverse().subtree(&name(0)).len(), LEN);
            assert_eq!(dag.topological_order().expect("acyclic").len(), LEN);

            let mut result = DagResult::new(&dag);
            for i in 0..LEN - 1 {
                result.get_mut(&name(i)).expect("known job").success();
            }
            result.get_mut(&name(LEN - 1)).expect("known job").not_ready();

            let boundary = result.boundary_subtrees(&dag);
            assert_eq!(boundary.len(), LEN - 1);
            assert_eq!(boundary.first(), Some(&name(0)));
            assert_eq!(boundary.last(), Some(&name(LEN - 2)));
        })
        .expect("spawn test thread");

    handle.join().expect("traversals completed without overflow");
}

#[test]
fn long_cycle_is_found_without_recursion() {
    const LEN: usize = 50_000;
    let name = |i: usize| format!("job_{i:05}");

    let mut dag = Dag::new();
    for i in 0..LEN {
        dag.insert(name(i), [name((i + 1) % LEN)]);
    }

    let handle = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(move || {
            let cycle = dag.find_cycle().expect("ring is a cycle");
            assert_eq!(cycle.len(), LEN + 1);
            assert_eq!(cycle.first(), cycle.last());
        })
        .expect("spawn test thread");

    handle.join().expect("cycle search completed without overflow");
}

use std::cell::RefCell;
use std::time::Duration;

use train_schedule::{
    AcceleratorMode, ConfigurationError, DatasetRepeat, ExampleCounts, ScheduleError,
    ScheduleManager, ScheduleParams, Sleeper, Split,
};

/// Records every requested delay instead of blocking.
#[derive(Default)]
struct RecordingSleeper {
    calls: RefCell<Vec<Duration>>,
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.calls.borrow_mut().push(duration);
    }
}

fn counts() -> ExampleCounts {
    ExampleCounts::new(100_000, 3_000)
}

fn fixed_step(shard_count: u64) -> ScheduleParams {
    ScheduleParams {
        batch_size: 2048,
        max_sequence_length: 64,
        accelerator: AcceleratorMode::FixedStep,
        shard_count,
        ..Default::default()
    }
}

/// Exactly one per-iteration quantity is set for every basis and mode.
#[test]
fn exactly_one_basis_quantity_is_set() {
    let bases = [
        (Some(10_000), None),
        (None, Some(6)),
        (None, None),
    ];

    for (train_steps, train_epochs) in bases {
        for accelerator in [AcceleratorMode::Standard, AcceleratorMode::FixedStep] {
            let params = ScheduleParams {
                train_steps,
                train_epochs,
                accelerator,
                batch_size: 2048,
                max_sequence_length: 64,
                ..Default::default()
            };
            let manager = ScheduleManager::new(&params, counts()).unwrap();
            let steps_basis = manager.basis().steps_per_iteration().is_some();
            let epochs_basis = manager.single_iteration_train_epochs().is_some();
            assert!(
                steps_basis ^ epochs_basis,
                "steps={train_steps:?} epochs={train_epochs:?} mode={accelerator}"
            );
        }
    }
}

/// Any pair of non-zero totals is rejected.
#[test]
fn both_totals_always_rejected() {
    for (steps, epochs) in [(1, 1), (1000, 3), (u64::MAX, 1)] {
        let params = ScheduleParams {
            train_steps: Some(steps),
            train_epochs: Some(epochs),
            ..Default::default()
        };
        let err = ScheduleManager::new(&params, counts()).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::InvalidConfiguration(ConfigurationError::BothBasesSpecified { .. })
        ));
    }
}

#[test]
fn iterations_floor_total_over_cadence() {
    let params = ScheduleParams {
        train_steps: Some(1000),
        steps_between_evals: 300,
        ..Default::default()
    };
    assert_eq!(
        ScheduleManager::new(&params, counts())
            .unwrap()
            .train_eval_iterations(),
        3
    );

    let params = ScheduleParams {
        train_epochs: Some(7),
        epochs_between_evals: 2,
        ..Default::default()
    };
    assert_eq!(
        ScheduleManager::new(&params, counts())
            .unwrap()
            .train_eval_iterations(),
        3
    );
}

#[test]
fn epoch_conversion_example() {
    let manager = ScheduleManager::new(&fixed_step(8), counts()).unwrap();
    assert_eq!(manager.epochs_to_steps(1, Split::Train).unwrap(), 3125);
    assert_eq!(manager.epochs_to_steps(2, Split::Train).unwrap(), 6250);
}

#[test]
fn shard_divisibility() {
    assert!(ScheduleManager::new(&fixed_step(8), counts()).is_ok());
    assert!(ScheduleManager::new(&fixed_step(32), counts()).is_ok());

    let err = ScheduleManager::new(&fixed_step(7), counts()).unwrap_err();
    assert!(matches!(
        err,
        ScheduleError::InvalidConfiguration(ConfigurationError::ShardMisaligned { .. })
    ));
    assert!(err.to_string().contains("shard_count 7"));
}

#[test]
fn progress_label_patterns() {
    let steps = ScheduleParams {
        train_steps: Some(5000),
        steps_between_evals: 1000,
        ..Default::default()
    };
    let epochs = ScheduleParams {
        train_epochs: Some(3),
        epochs_between_evals: 1,
        ..Default::default()
    };
    let fixed_epochs = ScheduleParams {
        train_epochs: Some(3),
        epochs_between_evals: 1,
        ..fixed_step(8)
    };

    let label = |params: &ScheduleParams| {
        ScheduleManager::new(params, counts())
            .unwrap()
            .train_increment_label()
    };
    assert_eq!(label(&steps), "1000 steps.");
    assert_eq!(label(&epochs), "1 epochs.");
    assert_eq!(label(&fixed_epochs), "~1 epochs. (3125 steps)");
}

#[test]
fn dataset_repeat_count() {
    let params = ScheduleParams {
        train_steps: Some(1_000_000),
        steps_between_evals: 250_000,
        ..Default::default()
    };
    let manager = ScheduleManager::new(&params, counts()).unwrap();
    assert_eq!(manager.repeat_dataset(), DatasetRepeat::Passes(3));
    assert_eq!(manager.repeat_dataset().passes(), Some(3));

    let params = ScheduleParams {
        train_steps: Some(1_000_000),
        steps_between_evals: 100_000,
        ..Default::default()
    };
    let manager = ScheduleManager::new(&params, counts()).unwrap();
    assert_eq!(manager.repeat_dataset(), DatasetRepeat::NoRepeat);
    assert_eq!(manager.repeat_dataset().passes(), None);
}

#[test]
fn cooldown_once_per_hook_in_fixed_step_mode() {
    let manager =
        ScheduleManager::with_sleeper(&fixed_step(8), counts(), RecordingSleeper::default())
            .unwrap();

    manager.post_train();
    assert_eq!(*manager.sleeper().calls.borrow(), vec![Duration::from_secs(60)]);

    manager.post_eval();
    assert_eq!(
        *manager.sleeper().calls.borrow(),
        vec![Duration::from_secs(60), Duration::from_secs(60)]
    );
}

#[test]
fn no_cooldown_in_standard_mode() {
    let manager = ScheduleManager::with_sleeper(
        &ScheduleParams::default(),
        counts(),
        RecordingSleeper::default(),
    )
    .unwrap();

    manager.post_train();
    manager.post_eval();
    assert!(manager.sleeper().calls.borrow().is_empty());
}

#[test]
fn conversion_outside_fixed_step_is_a_contract_breach() {
    let manager = ScheduleManager::new(&ScheduleParams::default(), counts()).unwrap();
    let err = manager.epochs_to_steps(1, Split::Eval).unwrap_err();
    assert!(matches!(err, ScheduleError::PreconditionViolation(_)));
}

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;

#[test]
fn test_double_confirmation_rejected() {
    let file = common::script(&[
        "create_order,o1,,Essay,History,2,,,,,",
        "pay,p1,o1,,,,,,mock,,",
        "confirm,,p1,,,,,,,,",
        "confirm,,p1,,,,,,,,",
    ]);

    let mut cmd = Command::new(cargo_bin!("orderpay"));
    cmd.arg(file.path()).arg("--report").arg("payments");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error processing command 4"))
        .stderr(predicate::str::contains("already confirmed"))
        .stdout(predicate::str::contains("p1,o1,mock,100,CNY,succeeded"));
}

#[test]
fn test_webhook_redelivery_is_silent() {
    let file = common::script(&[
        "create_order,o1,,Essay,History,2,,,,,",
        "pay,p1,o1,,,,,,stripe,,",
        "webhook,,p1,,,,,,stripe,,",
        "webhook,,p1,,,,,,stripe,,",
    ]);

    let mut cmd = Command::new(cargo_bin!("orderpay"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error processing").not())
        .stdout(predicate::str::contains("o1,Essay,2,normal,100,CNY,paid,"));
}

#[test]
fn test_paid_order_cannot_be_edited_or_paid_again() {
    let file = common::script(&[
        "create_order,o1,,Essay,History,2,,,,,",
        "edit_order,,o1,,,4,express,,,,",
        "pay,p1,o1,,,,,,alipay,,",
        "webhook,,p1,,,,,,alipay,,",
        "edit_order,,o1,,,8,,,,,",
        "pay,p2,o1,,,,,,mock,,",
    ]);

    let mut cmd = Command::new(cargo_bin!("orderpay"));
    cmd.arg(file.path());

    // The edit while pending changes pages and urgency but not the amount.
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("can no longer be edited"))
        .stderr(predicate::str::contains("payments require pending_payment"))
        .stdout(predicate::str::contains("o1,Essay,4,express,100,CNY,paid,"));
}

#[test]
fn test_reprice_on_edit_flag() {
    let file = common::script(&[
        "create_order,o1,,Essay,History,2,,,,,",
        "edit_order,,o1,,,4,express,,,,",
    ]);

    let mut cmd = Command::new(cargo_bin!("orderpay"));
    cmd.arg(file.path()).arg("--reprice-on-edit");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("o1,Essay,4,express,320,CNY,pending_payment,"));
}

#[test]
fn test_illegal_transitions_reported() {
    let file = common::script(&[
        "create_order,o1,,Essay,History,1,,,,,",
        "complete,,o1,,,,,,,,",
        "transition,,o1,,,,,,,shipped,",
        "transition,,o1,,,,,,,paid,",
        "submit,,o1,,,,,,,,",
        "complete,,o1,,,,,,,,",
        "transition,,o1,,,,,,,submitted,",
    ]);

    let mut cmd = Command::new(cargo_bin!("orderpay"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains(
            "Illegal transition from pending_payment to completed",
        ))
        .stderr(predicate::str::contains("Invalid status: shipped"))
        .stderr(predicate::str::contains(
            "Illegal transition from completed to submitted",
        ))
        .stdout(predicate::str::contains("o1,Essay,1,normal,50,CNY,completed,"));
}

#[test]
fn test_unsupported_provider() {
    let file = common::script(&[
        "create_order,o1,,Essay,History,1,,,,,",
        "pay,p1,o1,,,,,,paypal,,",
    ]);

    let mut cmd = Command::new(cargo_bin!("orderpay"));
    cmd.arg(file.path()).arg("--report").arg("payments");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Unsupported provider: paypal"))
        .stdout(predicate::str::contains("p1").not());
}

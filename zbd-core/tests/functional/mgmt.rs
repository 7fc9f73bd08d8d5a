// vim: tw=80
use nix::errno::Errno;
use pretty_assertions::assert_eq;
use rstest::rstest;

use zbd_core::{
    device::ZonedDevice,
    mgmt::manage,
    range::{self, ByteRange},
    types::*,
};

use super::{Emulator, EmulatorBuilder, MIB};

const ZS: u64 = 256 * MIB;

fn run(dev: &Emulator, op: ZoneOp, range: ByteRange) -> Result<()> {
    let cmd = Command::Manage(op);
    let range = range::validate(range, dev.geometry(), cmd.alignment())?;
    manage(dev, op, &range)
}

fn conditions(dev: &Emulator) -> Vec<ZoneCondition> {
    dev.zones().iter().map(|z| z.cond).collect()
}

#[test]
fn reset_is_idempotent() {
    let dev = EmulatorBuilder::new().build();
    dev.write(0, 4096);
    dev.write(1, ZS);
    let range = ByteRange::new(0, 2 * ZS);
    run(&dev, ZoneOp::Reset, range).unwrap();
    let once = dev.zones();
    run(&dev, ZoneOp::Reset, range).unwrap();
    assert_eq!(dev.zones(), once);
    assert!(once[..2].iter().all(|z| z.cond == ZoneCondition::Empty));
    assert!(once[..2].iter().all(|z| z.wp == z.start));
}

#[test]
fn lifecycle() {
    let dev = EmulatorBuilder::new().build();
    let zone1 = ByteRange::new(ZS, ZS);
    run(&dev, ZoneOp::Open, zone1).unwrap();
    assert_eq!(conditions(&dev)[1], ZoneCondition::ExplicitOpen);
    dev.write(1, 4096);
    run(&dev, ZoneOp::Close, zone1).unwrap();
    assert_eq!(conditions(&dev)[1], ZoneCondition::Closed);
    run(&dev, ZoneOp::Finish, zone1).unwrap();
    assert_eq!(conditions(&dev)[1], ZoneCondition::Full);
    assert_eq!(dev.zones()[1].wp, 2 * ZS);
    run(&dev, ZoneOp::Reset, zone1).unwrap();
    assert_eq!(conditions(&dev), vec![ZoneCondition::Empty; 4]);
}

/// Length 0 means the rest of the device
#[test]
fn finish_to_end() {
    let dev = EmulatorBuilder::new().build();
    run(&dev, ZoneOp::Finish, ByteRange::new(2 * ZS, 0)).unwrap();
    assert_eq!(conditions(&dev), vec![
        ZoneCondition::Empty,
        ZoneCondition::Empty,
        ZoneCondition::Full,
        ZoneCondition::Full,
    ]);
}

/// A smaller last zone can be managed as a whole zone
#[test]
fn runt() {
    let dev = EmulatorBuilder::new()
        .capacity(3 * ZS + 100 * MIB)
        .build();
    run(&dev, ZoneOp::Finish, ByteRange::new(3 * ZS, ZS)).unwrap();
    assert_eq!(conditions(&dev)[3], ZoneCondition::Full);
}

/// Misaligned ranges are rejected before the device sees them
#[rstest]
#[case(100 * MIB, 100 * MIB, Error::MisalignedZone)]
#[case(ZS, 100 * MIB, Error::MisalignedZone)]
#[case(4097, ZS, Error::MisalignedSector)]
fn misaligned(#[case] offset: u64, #[case] len: u64, #[case] e: Error) {
    let dev = EmulatorBuilder::new().build();
    dev.write(0, 4096);
    let before = dev.zones();
    let r = run(&dev, ZoneOp::Reset, ByteRange::new(offset, len));
    assert_eq!(r, Err(e));
    assert_eq!(dev.zones(), before);
}

#[test]
fn beyond_capacity() {
    let dev = EmulatorBuilder::new().build();
    dev.write(3, 4096);
    let before = dev.zones();
    run(&dev, ZoneOp::Reset, ByteRange::new(1 << 30, 0)).unwrap();
    assert_eq!(dev.zones(), before);
}

/// The device's refusal is reported verbatim
#[test]
fn conventional() {
    let dev = EmulatorBuilder::new()
        .conventional(1)
        .build();
    let r = run(&dev, ZoneOp::Open, ByteRange::new(0, ZS));
    assert_eq!(r, Err(Error::OperationFailed(Errno::EINVAL)));
}

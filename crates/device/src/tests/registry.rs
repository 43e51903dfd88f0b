use super::*;
use crate::{CustomTable, DeviceError, DriverType, RegistryTable};

fn uart() -> DriverInstance {
    DriverInstance::Uart(Arc::new(MockUart::new(Lifecycle::shared())))
}

#[test]
fn test_register_rejects_duplicate_names() {
    let mut table = RegistryTable::new();
    table.register("/dev/uart1", uart()).unwrap();
    assert_eq!(table.register("/dev/uart1", uart()), Err(DeviceError::AlreadyExists));
    table.register("/dev/uart2", uart()).unwrap();

    assert_eq!(table.len(), 2);
    let names: std::vec::Vec<_> = table.iter().map(|entry| entry.name()).collect();
    assert_eq!(names, ["/dev/uart1", "/dev/uart2"]);
}

#[test]
fn test_find_free_driver_reports_refusal() {
    let refusing = Arc::new(MockUart::new(Lifecycle::shared()));
    refusing.life.refuse_open();
    let mut table = RegistryTable::new();
    table
        .register("/dev/uart1", DriverInstance::Uart(refusing.clone()))
        .unwrap();

    assert_eq!(
        table.find_free_driver("/dev/uart1").unwrap_err(),
        DeviceError::Unavailable
    );
    assert_eq!(
        table.find_free_driver("/dev/uart9").unwrap_err(),
        DeviceError::NotFound
    );
}

#[test]
fn test_entry_reports_class_from_instance() {
    let mut table = RegistryTable::new();
    table
        .register("/dev/gpio0", DriverInstance::Gpio(Arc::new(MockGpio::new(4))))
        .unwrap();

    let entry = table.find_free_driver("/dev/gpio0").unwrap();
    assert_eq!(entry.driver_type(), DriverType::Gpio);
}

#[test]
fn test_custom_table_install_and_open() {
    setup();
    let table = CustomTable::new(4);
    let custom = Arc::new(MockCustom::default());
    let entry = table
        .install("/dev/led", DriverInstance::Custom(custom.clone()))
        .unwrap();
    assert_eq!(entry.driver_type(), DriverType::Custom);
    assert_eq!(custom.life.opens(), 0);

    let opened = table.find_free_driver("/dev/led").unwrap();
    assert!(Arc::ptr_eq(&opened, &entry));
    assert_eq!(custom.life.opens(), 1);
    assert_eq!(table.len(), 1);
    assert_eq!(table.capacity(), 4);
}

#[test]
#[should_panic(expected = "max custom drivers")]
fn test_custom_table_overflow_panics() {
    setup();
    let ctx = Board::new().builder().custom_capacity(2).build();
    ctx.install_custom_driver("/dev/a", Arc::new(MockCustom::default()))
        .unwrap();
    ctx.install_custom_driver("/dev/b", Arc::new(MockCustom::default()))
        .unwrap();
    let _ = ctx.install_custom_driver("/dev/c", Arc::new(MockCustom::default()));
}

#[test]
fn test_concurrent_custom_installs_are_serialized() {
    setup();
    let table = Arc::new(CustomTable::new(32));
    let workers: std::vec::Vec<_> = (0..4)
        .map(|hart| {
            let table = table.clone();
            spawn_on_hart(hart % 2, move || {
                for i in 0..8 {
                    let name = std::format!("/dev/custom{}-{}", hart, i);
                    table
                        .install(&name, DriverInstance::Custom(Arc::new(MockCustom::default())))
                        .unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(table.len(), 32);
}

#[test]
fn test_error_codes_are_negative_errno() {
    assert_eq!(DeviceError::NotFound.to_errno(), -2);
    assert_eq!(DeviceError::BadHandle.to_errno(), -9);
    assert_eq!(DeviceError::Unavailable.to_errno(), -16);
    assert_eq!(DeviceError::TooManyHandles.to_errno(), -24);
    assert_eq!(DeviceError::NotSupported.to_errno(), -95);
}

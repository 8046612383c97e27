#![no_main]

use libfuzzer_sys::fuzz_target;
use ironscope::ModuleView;

fuzz_target!(|data: &[u8]| {
    if let Ok(view) = ModuleView::from_mem(data.to_vec()) {
        let tables = view.tables();
        for typedef in tables.type_defs() {
            let _ = typedef.name();
            let _ = typedef.methods();
        }
    }
});

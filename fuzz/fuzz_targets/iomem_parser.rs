#![no_main]

use libfuzzer_sys::fuzz_target;
use memtype::classifier::Classifier;
use memtype::iomem::IoMem;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must parse and classify without panicking
    let classifier = Classifier::new(IoMem::parse_bytes(data));
    for region in classifier.iomem().regions() {
        let _ = classifier.classify(region.start);
        let _ = classifier.classify(region.end);
    }
});

#![no_main]

use em5_lane_navigation::TrafficLaneWorldBinarySerializer;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Darf nie paniken; gelesene Welten müssen sich verlustfrei neu schreiben lassen
    if let Ok((world, _)) = TrafficLaneWorldBinarySerializer::deserialize(data) {
        if let Ok(bytes) = TrafficLaneWorldBinarySerializer::serialize(&world) {
            let (again, _) = TrafficLaneWorldBinarySerializer::deserialize(&bytes)
                .expect("neu geschriebene Welt muss lesbar sein");
            assert!(again.structurally_equal(&world));
        }
    }
});

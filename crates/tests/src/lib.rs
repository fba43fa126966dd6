//! # Integration Tests
//!
//! Cross-crate scenarios driven over the public APIs:
//! - deterministic tick scenarios (dedup, modality independence)
//! - status escalation cadence
//! - attach/detach lifecycle rules
//! - end-to-end periodic run against the synthetic source

#[cfg(test)]
mod scenario {
    use observability::RelayMetricsAggregator;
    use relay::{run_tick, AcquisitionCycle, CyclePublishers, StatusMonitor, TickDecision};
    use sensor_factory::MockRgbdSensor;
    use transport::{MemorySink, MessageStore, TransportNode};

    /// Four memory-backed topics wired the way the CLI wires real sinks.
    pub struct Fixture {
        pub node: TransportNode,
        pub cycle: AcquisitionCycle,
        pub monitor: StatusMonitor,
        pub stats: RelayMetricsAggregator,
        pub color_image: MessageStore,
        pub depth_image: MessageStore,
        pub color_info: MessageStore,
        pub depth_info: MessageStore,
    }

    impl Fixture {
        pub fn new(force_info_sync: bool) -> Self {
            let mut node = TransportNode::new("test_relay");
            let color_image = MessageStore::new();
            let depth_image = MessageStore::new();
            let color_info = MessageStore::new();
            let depth_info = MessageStore::new();

            let publishers = CyclePublishers {
                color_image: node
                    .advertise(MemorySink::new("/camera/color/image", color_image.clone()), 64),
                depth_image: node
                    .advertise(MemorySink::new("/camera/depth/image", depth_image.clone()), 64),
                color_info: node
                    .advertise(MemorySink::new("/camera/color/info", color_info.clone()), 64),
                depth_info: node
                    .advertise(MemorySink::new("/camera/depth/info", depth_info.clone()), 64),
            };

            Fixture {
                node,
                cycle: AcquisitionCycle::new("camera_link".into(), force_info_sync, publishers),
                monitor: StatusMonitor::new(),
                stats: RelayMetricsAggregator::new(),
                color_image,
                depth_image,
                color_info,
                depth_info,
            }
        }

        pub fn tick(&mut self, sensor: &MockRgbdSensor) -> TickDecision {
            run_tick(
                Some(sensor),
                &mut self.monitor,
                &mut self.cycle,
                &mut self.stats,
            )
        }

        /// Drain the topic queues so the stores reflect every publish.
        pub async fn settle(self) -> (MessageStore, MessageStore, MessageStore, MessageStore) {
            drop(self.cycle);
            self.node.teardown().await;
            (
                self.color_image,
                self.depth_image,
                self.color_info,
                self.depth_info,
            )
        }
    }
}

/// The dedup scenario from the wire contract: ticks fed (1,1), (1,2), (3,3)
/// publish both / depth only / both.
#[cfg(test)]
mod dedup_scenario {
    use super::scenario::Fixture;
    use sensor_factory::MockRgbdSensor;

    #[tokio::test]
    async fn test_three_tick_dedup_outcomes() {
        let mut fixture = Fixture::new(false);
        let sensor = MockRgbdSensor::new();
        sensor.push_stamps(1.0, 1.0);
        sensor.push_stamps(1.0, 2.0);
        sensor.push_stamps(3.0, 3.0);

        fixture.tick(&sensor);
        fixture.tick(&sensor);
        fixture.tick(&sensor);

        let summary = fixture.stats.summary();
        assert_eq!(summary.total_ticks, 3);
        assert_eq!(summary.color_published, 2, "color rejected on tick 2");
        assert_eq!(summary.depth_published, 3);
        assert_eq!(summary.color_stale, 1);
        assert_eq!(summary.depth_stale, 0);

        let (color_image, depth_image, color_info, depth_info) = fixture.settle().await;
        assert_eq!(color_image.len(), 2);
        assert_eq!(depth_image.len(), 3);
        assert_eq!(color_info.len(), 2);
        assert_eq!(depth_info.len(), 3);

        // Published color stamps are exactly the accepted ones
        let stamps: Vec<f64> = color_image.snapshot().iter().map(|m| m.stamp()).collect();
        assert_eq!(stamps, vec![1.0, 3.0]);
    }
}

#[cfg(test)]
mod independence_scenario {
    use super::scenario::Fixture;
    use contracts::RelayMessage;
    use sensor_factory::{plumb_bob_params, MockRgbdSensor};

    /// An induced depth-intrinsics failure must not prevent color image,
    /// color info, or depth image publication in the same tick.
    #[tokio::test]
    async fn test_depth_intrinsics_failure_is_isolated() {
        let mut fixture = Fixture::new(false);
        let sensor = MockRgbdSensor::new();
        sensor.push_stamps(1.0, 1.0);
        sensor.set_depth_params(None);

        fixture.tick(&sensor);

        assert_eq!(fixture.stats.summary().intrinsics_errors, 1);

        let (color_image, depth_image, color_info, depth_info) = fixture.settle().await;
        assert_eq!(color_image.len(), 1);
        assert_eq!(depth_image.len(), 1);
        assert_eq!(color_info.len(), 1);
        assert!(depth_info.is_empty());
    }

    /// A bag missing k3 fails closed, naming the field; only that
    /// modality's info publication is skipped for the tick.
    #[tokio::test]
    async fn test_missing_k3_skips_info_only() {
        let mut fixture = Fixture::new(false);
        let sensor = MockRgbdSensor::new();
        sensor.push_stamps(1.0, 1.0);

        let mut bag = plumb_bob_params(1.0);
        bag.remove("k3");
        sensor.set_color_params(Some(bag));

        fixture.tick(&sensor);

        let (color_image, _, color_info, depth_info) = fixture.settle().await;
        assert_eq!(color_image.len(), 1, "image already out before intrinsics");
        assert!(color_info.is_empty(), "no partial camera info");
        assert_eq!(depth_info.len(), 1, "depth modality unaffected");
    }

    /// Capture failure ends the tick with no publication at all.
    #[tokio::test]
    async fn test_capture_failure_publishes_nothing() {
        let mut fixture = Fixture::new(false);
        let sensor = MockRgbdSensor::new();
        sensor.set_fail_capture(true);

        fixture.tick(&sensor);
        assert_eq!(fixture.stats.summary().capture_errors, 1);

        let (color_image, depth_image, color_info, depth_info) = fixture.settle().await;
        assert!(color_image.is_empty());
        assert!(depth_image.is_empty());
        assert!(color_info.is_empty());
        assert!(depth_info.is_empty());
    }

    /// forceInfoSync makes the info message borrow the image stamp.
    #[tokio::test]
    async fn test_forced_info_sync_stamps() {
        let mut fixture = Fixture::new(true);
        let sensor = MockRgbdSensor::new();
        sensor.set_color_params(Some(plumb_bob_params(77.0)));
        sensor.push_stamps(2.0, 2.0);

        fixture.tick(&sensor);

        let (_, _, color_info, _) = fixture.settle().await;
        match &color_info.snapshot()[0] {
            RelayMessage::Info(info) => assert_eq!(info.header.stamp, 2.0),
            other => panic!("expected camera info, got {other:?}"),
        }
    }
}

#[cfg(test)]
mod status_scenario {
    use super::scenario::Fixture;
    use contracts::SensorStatus;
    use relay::{TickDecision, WaitAnnounce};
    use sensor_factory::MockRgbdSensor;

    /// NotReady x1200: info announcements at ticks 0, 30, ..., 990, warning
    /// announcements on every tick from 1000; the counter resets the moment
    /// the sensor reports Ok.
    #[tokio::test]
    async fn test_not_ready_escalation_cadence() {
        let mut fixture = Fixture::new(false);
        let sensor = MockRgbdSensor::new();
        sensor.set_status(SensorStatus::NotReady);

        let mut info_ticks = Vec::new();
        let mut warn_count = 0u32;
        for tick in 0..1200u32 {
            match fixture.tick(&sensor) {
                TickDecision::Wait(WaitAnnounce::Info) => info_ticks.push(tick),
                TickDecision::Wait(WaitAnnounce::Warn) => warn_count += 1,
                TickDecision::Wait(WaitAnnounce::Quiet) => {}
                other => panic!("unexpected decision {other:?}"),
            }
        }

        assert_eq!(info_ticks.first(), Some(&0));
        assert_eq!(info_ticks.last(), Some(&990));
        assert_eq!(info_ticks.len(), 34); // 0, 30, ..., 990
        assert!(info_ticks.iter().all(|t| t % 30 == 0));
        assert_eq!(warn_count, 200); // 1000..1199

        // Recovery resets the counter and the cadence starts over
        sensor.set_status(SensorStatus::Ok);
        sensor.push_stamps(1.0, 1.0);
        assert_eq!(fixture.tick(&sensor), TickDecision::Capture);
        assert_eq!(fixture.monitor.waited(), 0);

        sensor.set_status(SensorStatus::NotReady);
        assert_eq!(
            fixture.tick(&sensor),
            TickDecision::Wait(WaitAnnounce::Info)
        );

        fixture.settle().await;
    }

    /// An explicit error status is reported every tick with no recovery
    /// action and no capture attempt.
    #[tokio::test]
    async fn test_sensor_fault_reported_without_capture() {
        let mut fixture = Fixture::new(false);
        let sensor = MockRgbdSensor::new();
        sensor.set_status(SensorStatus::Error);
        sensor.push_stamps(1.0, 1.0);

        assert_eq!(fixture.tick(&sensor), TickDecision::Fault);
        assert_eq!(fixture.tick(&sensor), TickDecision::Fault);
        assert_eq!(sensor.queued_frames(), 1, "no capture was attempted");

        let (color_image, ..) = fixture.settle().await;
        assert!(color_image.is_empty());
    }
}

#[cfg(test)]
mod config_flow {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{RgbdSensor, SensorStatus};

    const CONFIG: &str = r#"
period_ms = 10
force_info_sync = true

[node]
name = "rgbd_relay"
frame_id = "camera_link"

[topics]
color_image = "/camera/color/image"
depth_image = "/camera/depth/image"
color_info = "/camera/color/info"
depth_info = "/camera/depth/info"

[subdevice]
kind = "test_pattern"

[subdevice.params]
width = "32"
height = "24"
"#;

    /// Configuration drives source construction end to end: parse the TOML,
    /// hand the subdevice spec to the factory, and get a live source with
    /// the configured geometry.
    #[test]
    fn test_config_to_source() {
        let config = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        assert!(config.force_info_sync);

        let spec = config.subdevice.expect("subdevice configured");
        let source = sensor_factory::create_source(&spec).unwrap();

        assert_eq!(source.status(), SensorStatus::Ok);
        assert_eq!(source.color_dimensions(), (32, 24));
        let pair = source.frame_pair().unwrap();
        assert_eq!(pair.color.width, 32);
        assert_eq!(pair.depth.height, 24);
    }

    /// An unknown subdevice kind survives config validation (the registry
    /// owns that knowledge) but fails at construction time.
    #[test]
    fn test_unknown_subdevice_fails_at_factory() {
        let mut config = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        let mut spec = config.subdevice.take().expect("subdevice configured");
        spec.kind = "structured_light".into();

        let err = sensor_factory::create_source(&spec).unwrap_err();
        assert!(err.to_string().contains("structured_light"));
    }
}

#[cfg(test)]
mod lifecycle {
    use std::sync::Arc;

    use contracts::{
        NodeConfig, RelayConfig, RelayError, SubdeviceConfig, TopicConfig, TransportConfig,
    };
    use relay::{CyclePublishers, RgbdRelay};
    use sensor_factory::MockRgbdSensor;
    use transport::{MemorySink, MessageStore, TransportNode};

    fn config(subdevice: Option<SubdeviceConfig>) -> RelayConfig {
        RelayConfig {
            node: NodeConfig {
                name: "rgbd_relay".into(),
                frame_id: "camera_link".into(),
            },
            period_ms: 5,
            topics: TopicConfig {
                color_image: "/camera/color/image".into(),
                depth_image: "/camera/depth/image".into(),
                color_info: "/camera/color/info".into(),
                depth_info: "/camera/depth/info".into(),
            },
            force_info_sync: false,
            subdevice,
            transport: TransportConfig::default(),
        }
    }

    fn wire(node: &mut TransportNode, store: &MessageStore) -> CyclePublishers {
        CyclePublishers {
            color_image: node.advertise(MemorySink::new("/camera/color/image", store.clone()), 64),
            depth_image: node.advertise(MemorySink::new("/camera/depth/image", store.clone()), 64),
            color_info: node.advertise(MemorySink::new("/camera/color/info", store.clone()), 64),
            depth_info: node.advertise(MemorySink::new("/camera/depth/info", store.clone()), 64),
        }
    }

    /// Attach immediately followed by detach: accepted for an externally
    /// supplied source, refused only while the relay owns its subdevice.
    #[tokio::test]
    async fn test_attach_detach_ownership_rule() {
        let store = MessageStore::new();
        let mut node = TransportNode::new("test");
        let mut external = RgbdRelay::new(&config(None), wire(&mut node, &store));

        external
            .attach(Some(Arc::new(MockRgbdSensor::new())))
            .await
            .unwrap();
        assert!(external.detach().await.is_ok());

        let mut owned = RgbdRelay::new(
            &config(Some(SubdeviceConfig {
                kind: "test_pattern".into(),
                params: Default::default(),
            })),
            wire(&mut node, &store),
        );
        owned
            .attach(Some(Arc::new(MockRgbdSensor::new())))
            .await
            .unwrap();
        assert!(matches!(
            owned.detach().await,
            Err(RelayError::OwnershipConflict)
        ));

        owned.close().await;
        drop(external);
        drop(owned);
        node.teardown().await;
    }

    #[tokio::test]
    async fn test_attach_none_is_invalid_handle() {
        let store = MessageStore::new();
        let mut node = TransportNode::new("test");
        let mut relay = RgbdRelay::new(&config(None), wire(&mut node, &store));

        assert!(matches!(
            relay.attach(None).await,
            Err(RelayError::InvalidHandle)
        ));

        drop(relay);
        node.teardown().await;
    }
}

#[cfg(test)]
mod e2e {
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{NodeConfig, RelayConfig, RelayMessage, TopicConfig, TransportConfig};
    use relay::{CyclePublishers, RgbdRelay};
    use sensor_factory::{SyntheticConfig, SyntheticRgbdSensor};
    use transport::{MemorySink, MessageStore, TransportNode};

    /// End-to-end: synthetic source -> periodic relay -> memory transport.
    ///
    /// Verifies the full flow:
    /// 1. the periodic task polls and captures at the configured cadence
    /// 2. all four topics receive messages
    /// 3. image stamps on one topic are strictly increasing (dedup holds
    ///    under a free-running source)
    #[tokio::test]
    async fn test_e2e_periodic_relay() {
        let config = RelayConfig {
            node: NodeConfig {
                name: "rgbd_relay".into(),
                frame_id: "camera_link".into(),
            },
            period_ms: 5,
            topics: TopicConfig {
                color_image: "/camera/color/image".into(),
                depth_image: "/camera/depth/image".into(),
                color_info: "/camera/color/info".into(),
                depth_info: "/camera/depth/info".into(),
            },
            force_info_sync: true,
            subdevice: None,
            transport: TransportConfig::default(),
        };

        let mut node = TransportNode::new(&config.node.name);
        let color_image = MessageStore::new();
        let depth_image = MessageStore::new();
        let color_info = MessageStore::new();
        let depth_info = MessageStore::new();

        let publishers = CyclePublishers {
            color_image: node
                .advertise(MemorySink::new("/camera/color/image", color_image.clone()), 64),
            depth_image: node
                .advertise(MemorySink::new("/camera/depth/image", depth_image.clone()), 64),
            color_info: node
                .advertise(MemorySink::new("/camera/color/info", color_info.clone()), 64),
            depth_info: node
                .advertise(MemorySink::new("/camera/depth/info", depth_info.clone()), 64),
        };

        let mut relay = RgbdRelay::new(&config, publishers);
        let source = Arc::new(SyntheticRgbdSensor::new(SyntheticConfig {
            width: 16,
            height: 12,
            frequency_hz: 1000.0, // every poll sees a fresh stamp
            depth_m: 1.5,
        }));

        relay.attach(Some(source)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        relay.close().await;
        let summary = relay.stats();
        drop(relay);
        node.teardown().await;

        assert!(summary.total_ticks >= 5, "ticks: {}", summary.total_ticks);
        assert!(!color_image.is_empty());
        assert!(!depth_image.is_empty());
        assert!(!color_info.is_empty());
        assert!(!depth_info.is_empty());

        // Dedup invariant: stamps strictly increase on each image topic
        let stamps: Vec<f64> = color_image
            .snapshot()
            .iter()
            .map(RelayMessage::stamp)
            .collect();
        assert!(
            stamps.windows(2).all(|pair| pair[0] < pair[1]),
            "stamps not strictly increasing: {stamps:?}"
        );

        // Forced sync: every info stamp equals some image stamp
        for info in color_info.snapshot() {
            assert!(
                stamps.contains(&info.stamp()),
                "info stamp {} has no paired image",
                info.stamp()
            );
        }
    }
}

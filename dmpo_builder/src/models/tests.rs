//! Tests for agent descriptions and their networks.

use super::*;
use crate::config::BuildError;
use crate::normalizers::ObservationNormalizer;
use burn::backend::NdArray;
use burn::prelude::*;

type TestBackend = NdArray<f32>;

fn head() -> DiffusionPolicyHead {
    DiffusionPolicyHead {
        device: DeviceSpec::new("cpu"),
        num_diffusion_steps: 10,
        hidden_dim: 32,
        n_hidden: 2,
        n_blocks: 3,
        sigma_data: 0.5,
        sampler_type: "ddim".to_owned(),
        model_type: "mlp".to_owned(),
    }
}

fn graph() -> AgentGraph {
    AgentGraph {
        actor: DiffusionActor::new(Encoder::Identity, Torso::Identity, head()),
        critic: Critic {
            encoder: Encoder::ObservationAction,
            torso: Torso::Mlp(MlpTorso {
                hidden_layers: vec![64, 48],
                activation: Activation::Tanh,
            }),
            head: CriticHead::Value,
            device: DeviceSpec::new("cpu"),
        },
        temperature: Temperature {
            encoder: Encoder::Identity,
            hidden_dim: 16,
            n_hidden: 1,
            device: DeviceSpec::new("cpu"),
        },
        observation_normalizer: Some(ObservationNormalizer::MeanStd { clip: None }),
        actor_squash: true,
        action_scale: 2.0,
        target_coeff: DEFAULT_TARGET_COEFF,
    }
}

fn batch(rows: usize, cols: usize, device: &<TestBackend as Backend>::Device) -> Tensor<TestBackend, 2> {
    Tensor::<TestBackend, 2>::ones([rows, cols], device).mul_scalar(0.3)
}

// ============================================================================
// DESCRIPTION TESTS
// ============================================================================

mod description_tests {
    use super::*;

    #[test]
    fn should_compute_feature_widths_per_stage() {
        assert_eq!(Encoder::Identity.output_size(5, 2), 5);
        assert_eq!(Encoder::ObservationAction.output_size(5, 2), 7);
        assert_eq!(Torso::Identity.output_size(7), 7);
        let mlp = Torso::Mlp(MlpTorso {
            hidden_layers: vec![256, 128],
            activation: Activation::Relu,
        });
        assert_eq!(mlp.output_size(7), 128);
    }

    #[test]
    fn should_serialize_with_configuration_names() {
        let json = serde_json::to_value(graph()).unwrap();
        assert_eq!(json["actor"]["encoder"], "IdentityEncoder");
        assert_eq!(json["actor"]["torso"]["name"], "IdentityTorso");
        assert_eq!(json["critic"]["torso"]["name"], "MLP");
        assert_eq!(json["critic"]["torso"]["activation"], "Tanh");
        assert_eq!(json["critic"]["head"]["name"], "ValueHead");
        assert_eq!(json["critic"]["device"], "cpu");
        assert_eq!(json["observation_normalizer"]["name"], "MeanStd");
    }
}

// ============================================================================
// NETWORK TESTS
// ============================================================================

mod network_tests {
    use super::*;

    #[test]
    fn should_build_mlp_widths_in_order_with_named_activation() {
        let device = Default::default();
        let torso = Torso::Mlp(MlpTorso {
            hidden_layers: vec![256, 256],
            activation: Activation::Relu,
        });
        let network = torso.init::<TestBackend>(10, &device);
        assert_eq!(network.widths(), vec![256, 256]);
        assert_eq!(network.activation(), Activation::Relu);
        assert_eq!(network.input_size(), Some(10));
    }

    #[test]
    fn should_pass_features_through_identity_torso() {
        let device = Default::default();
        let network = Torso::Identity.init::<TestBackend>(3, &device);
        assert!(network.is_identity());
        let x = batch(2, 3, &device);
        let y = network.forward(x.clone());
        assert_eq!(
            y.into_data().to_vec::<f32>().unwrap(),
            x.into_data().to_vec::<f32>().unwrap()
        );
    }

    #[test]
    fn should_score_state_action_pairs() {
        let device = Default::default();
        let critic = graph().critic.init::<TestBackend>(5, 2, &device);
        assert_eq!(critic.input_size(), 7);
        assert_eq!(critic.torso().widths(), vec![64, 48]);

        let values = critic.forward(batch(4, 5, &device), batch(4, 2, &device));
        assert_eq!(values.dims(), [4, 1]);
    }

    #[test]
    fn should_denoise_to_action_shape() {
        let device = Default::default();
        let actor = graph().actor.init::<TestBackend>(5, 2, &device);
        assert_eq!(actor.num_blocks(), 3);
        assert_eq!(actor.hidden_dim(), 32);
        assert_eq!(actor.action_size(), 2);
        assert_eq!(actor.num_diffusion_steps(), 10);

        let sigma = Tensor::<TestBackend, 2>::ones([4, 1], &device);
        let denoised = actor.denoise(batch(4, 5, &device), batch(4, 2, &device), sigma);
        assert_eq!(denoised.dims(), [4, 2]);
    }

    #[test]
    fn should_produce_positive_temperatures() {
        let device = Default::default();
        let temperature = graph().temperature.init::<TestBackend>(5, 2, &device);
        assert_eq!(temperature.torso().widths(), vec![16]);

        let values = temperature.temperature(batch(3, 5, &device)).into_data();
        assert!(values.to_vec::<f32>().unwrap().iter().all(|&t| t > 0.0));
    }
}

// ============================================================================
// INITIALIZATION TESTS
// ============================================================================

mod initialization_tests {
    use super::*;

    struct Collect(Vec<f32>);

    impl burn::module::ModuleMapper<TestBackend> for Collect {
        fn map_float<const D: usize>(
            &mut self,
            param: burn::module::Param<Tensor<TestBackend, D>>,
        ) -> burn::module::Param<Tensor<TestBackend, D>> {
            self.0
                .extend(param.val().into_data().to_vec::<f32>().unwrap());
            param
        }
    }

    /// Every float parameter of `module`, in traversal order.
    fn params<M: burn::module::Module<TestBackend>>(module: &M) -> Vec<f32> {
        let mut collect = Collect(Vec::new());
        let _ = module.clone().map(&mut collect);
        collect.0
    }

    #[test]
    fn should_start_targets_equal_to_online_networks() {
        let agent = graph()
            .initialize::<TestBackend, _>(5, 2, &CpuPlacement)
            .unwrap();
        assert_eq!(params(&agent.actor), params(&agent.target_actor));
        assert_eq!(params(&agent.critic), params(&agent.target_critic));
        assert_eq!(agent.observation_normalizer.as_ref().map(|n| n.dim()), Some(5));
    }

    #[test]
    fn should_move_targets_by_target_coeff() {
        let mut agent = graph()
            .with_target_coeff(0.25)
            .initialize::<TestBackend, _>(3, 1, &CpuPlacement)
            .unwrap();
        let fresh = graph()
            .initialize::<TestBackend, _>(3, 1, &CpuPlacement)
            .unwrap();
        // Swap in an unrelated online critic so online and target differ.
        agent.critic = fresh.critic;
        let online = params(&agent.critic);
        let target = params(&agent.target_critic);

        agent.update_targets();

        let updated = params(&agent.target_critic);
        for i in 0..online.len() {
            let expected = 0.25 * online[i] + 0.75 * target[i];
            assert!((updated[i] - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn should_leave_normalizer_slot_empty_when_not_configured() {
        let agent = graph()
            .with_observation_normalizer(None)
            .initialize::<TestBackend, _>(4, 2, &CpuPlacement)
            .unwrap();
        assert!(agent.observation_normalizer.is_none());

        let device = Default::default();
        let x = batch(2, 4, &device);
        assert_eq!(
            agent
                .normalize_observations(x.clone())
                .into_data()
                .to_vec::<f32>()
                .unwrap(),
            x.into_data().to_vec::<f32>().unwrap()
        );
    }

    #[test]
    fn should_squash_then_scale_actions() {
        let agent = graph()
            .initialize::<TestBackend, _>(4, 1, &CpuPlacement)
            .unwrap();
        let device = Default::default();
        let raw = Tensor::<TestBackend, 1>::from_floats([100.0, -100.0], &device).reshape([2, 1]);
        let actions = agent.postprocess_actions(raw).into_data().to_vec::<f32>().unwrap();
        assert!((actions[0] - 2.0).abs() < 1e-5);
        assert!((actions[1] + 2.0).abs() < 1e-5);
    }

    #[test]
    fn should_fail_on_devices_the_placement_cannot_honor() {
        let mut graph = graph();
        graph.critic.device = DeviceSpec::new("cuda:0");
        let err = graph
            .initialize::<TestBackend, _>(4, 2, &CpuPlacement)
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::UnavailableDevice { ref device, component: "critic" } if device == "cuda:0"
        ));
    }

    #[test]
    fn should_reject_zero_sizes() {
        let err = graph()
            .initialize::<TestBackend, _>(0, 2, &CpuPlacement)
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidValue { ref path, .. } if path == "observation_size"));
    }

    #[test]
    fn should_keep_action_encoders_out_of_actor_and_temperature() {
        let mut actor_graph = graph();
        actor_graph.actor.encoder = Encoder::ObservationAction;
        let err = actor_graph
            .initialize::<TestBackend, _>(4, 2, &CpuPlacement)
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidValue { ref path, .. } if path == "actor.encoder"));

        let mut temperature_graph = graph();
        temperature_graph.temperature.encoder = Encoder::ObservationAction;
        let err = temperature_graph
            .initialize::<TestBackend, _>(4, 2, &CpuPlacement)
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::InvalidValue { ref path, .. } if path == "temperature.encoder"
        ));
    }
}

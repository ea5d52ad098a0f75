// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ephemeral browser sessions on Kubernetes.
//!
//! Each session is one pod running a browser image and one service in front of
//! it. This crate provides:
//!
//! - [`Provisioner`], which creates the pod, waits for it to become Ready,
//!   exposes it through a service and hands back a [`SessionHandle`]
//! - the pod and service builders, including merging of caller-supplied pod
//!   templates
//! - a [`Teardown`] bound to each session for deleting it again
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use selkie_k8s::KubeClient;
//! use selkie_provisioner::{Provisioner, ProvisionerConfig, SessionRequest};
//!
//! # async fn example(req: SessionRequest) -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(KubeClient::new().await?);
//! let provisioner = Provisioner::new(client, ProvisionerConfig::default());
//!
//! let session = provisioner.start(&req).await?;
//! println!("WebDriver at {}", session.url);
//! session.teardown.run().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod env;
pub mod error;
pub mod identity;
pub mod merge;
pub mod pod;
pub mod provisioner;
pub mod readiness;
pub mod service;
pub mod types;

pub use config::{
	BrowserResources, NamingStrategy, NetworkConfig, OwnerReferenceConfig, ProvisionerConfig,
};
pub use error::{ProvisionerError, ResourceKind, StartError};
pub use identity::NetworkIdentity;
pub use provisioner::{Provisioner, SessionHandle, Teardown, DELETE_GRACE_PERIOD_SECS};
pub use readiness::{ReadinessPoller, ReadinessReport};
pub use types::{
	Capabilities, ContainerInfo, CreatedResources, HostPort, RequestId, ServiceDescriptor,
	SessionId, SessionRequest,
};

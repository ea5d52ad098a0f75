// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! K8s client abstraction for selkie browser provisioning.
//!
//! This crate provides:
//! - A trait-based K8s client abstraction for testability
//! - Production implementation using the kube crate
//! - Re-exported `k8s-openapi` types for pods and services

mod client;
mod error;
mod kube_client;
mod types;

pub use client::K8sClient;
pub use error::K8sError;
pub use kube_client::KubeClient;
pub use types::{
	Container, ContainerPort, EmptyDirVolumeSource, EnvVar, HTTPGetAction, IntOrString, Namespace,
	ObjectMeta, OwnerReference, Pod, PodCondition, PodSpec, PodStatus, Probe, Quantity,
	ResourceRequirements, Service, ServicePort, ServiceSpec, Volume, VolumeMount,
};
